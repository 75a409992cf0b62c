use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use csrfgate::cli::{Cli, Commands};
use csrfgate::config::StaticConfig;
use csrfgate::runtime::modes::{run_cli, run_server};
use csrfgate::system::init_logging;

async fn run_server_mode(config_path: &str) -> ExitCode {
    let config = match StaticConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    // guard 必须存活到进程结束，确保日志刷盘
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return ExitCode::FAILURE;
        }
    };

    match run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command_or_default() {
        Commands::Serve => run_server_mode(&cli.config).await,
        command => match run_cli(command, &cli.config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_colored());
                ExitCode::FAILURE
            }
        },
    }
}
