//! CLI interface module
//!
//! 离线命令：签发 / 校验 token、生成密钥、生成示例配置。
//! token 命令总是使用无状态校验，one_time 登记表只存在于服务进程中。

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use crate::csrf::CsrfError;
use crate::errors::AppError;
use commands::{config_generate, generate_secret, issue_token, verify_token};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    ConfigError(String),
    CommandError(String),
    VerificationFailed(CsrfError),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ConfigError(msg) => format!("Config error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
            CliError::VerificationFailed(err) => format!("Verification failed: {}", err),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ConfigError(msg) => {
                format!("{} {}", "Config error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
            CliError::VerificationFailed(err) => format!(
                "{} {} ({})",
                "Verification failed:".red().bold(),
                err.to_string().white(),
                err.kind().dimmed()
            ),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<AppError> for CliError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidConfig(_) | AppError::ConfigLoad(_) => {
                CliError::ConfigError(err.message().to_string())
            }
            other => CliError::CommandError(other.to_string()),
        }
    }
}

impl From<CsrfError> for CliError {
    fn from(err: CsrfError) -> Self {
        CliError::VerificationFailed(err)
    }
}

/// Run a CLI command from clap-parsed input
pub fn run_cli_command(cmd: Commands, config_path: &str) -> Result<(), CliError> {
    match cmd {
        Commands::Issue => issue_token(config_path),
        Commands::Verify { token } => verify_token(config_path, &token),
        Commands::GenerateSecret { bytes } => generate_secret(bytes as usize),
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force),
        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by server mode".to_string(),
        )),
    }
}
