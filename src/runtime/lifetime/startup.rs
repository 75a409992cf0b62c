use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::AppContext;
use crate::config::{CsrfMode, StaticConfig};
use crate::csrf::{CsrfProtector, SystemClock};

pub struct StartupContext {
    pub app: AppContext,
    /// one_time 模式下的过期登记清理任务
    pub purge_task: Option<JoinHandle<()>>,
}

/// 准备服务器启动的上下文
///
/// 配置校验失败（如密钥缺失）在这里终止启动，不会开始监听。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config.validate().context("Invalid configuration")?;

    let app = AppContext::from_config(config, Arc::new(SystemClock))
        .context("Failed to initialize CSRF guard")?;

    let purge_task = match config.csrf.mode {
        CsrfMode::OneTime => Some(spawn_purge_task(
            app.protector.clone(),
            Duration::from_secs(config.csrf.purge_interval_secs),
        )),
        CsrfMode::Stateless => None,
    };

    info!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );

    Ok(StartupContext { app, purge_task })
}

/// 定期清理过期的一次性 token 登记
pub fn spawn_purge_task(protector: Arc<dyn CsrfProtector>, interval: Duration) -> JoinHandle<()> {
    info!("CSRF purge task started, interval {:?}", interval);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即返回
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = protector.purge_expired();
            if purged > 0 {
                debug!("Purge cycle removed {} expired tokens", purged);
            }
        }
    })
}
