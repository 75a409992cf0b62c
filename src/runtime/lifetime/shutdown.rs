use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 单个任务超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C（Unix 下还包括 SIGTERM）
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn listen_for_shutdown(purge_task: Option<JoinHandle<()>>) {
    wait_for_signal().await;
    info!("Shutdown signal received, stopping background tasks...");
    stop_background_tasks(purge_task).await;
}

/// 停止后台任务（在超时内完成）
pub async fn stop_background_tasks(purge_task: Option<JoinHandle<()>>) {
    let Some(task) = purge_task else {
        return;
    };

    task.abort();
    match timeout(Duration::from_secs(TASK_TIMEOUT_SECS), task).await {
        Ok(Err(e)) if e.is_cancelled() => info!("CSRF purge task stopped"),
        Ok(Err(e)) => error!("CSRF purge task failed: {}", e),
        Ok(Ok(())) => info!("CSRF purge task finished"),
        Err(_) => error!(
            "CSRF purge task did not stop within {} seconds",
            TASK_TIMEOUT_SECS
        ),
    }
}
