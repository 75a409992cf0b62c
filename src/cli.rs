//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::csrf::CsrfSecret;

/// csrfgate - CSRF token issuance and verification service
#[derive(Parser, Debug)]
#[command(name = "csrfgate")]
#[command(version)]
#[command(about = "CSRF token issuance and verification service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Issue a token with the configured secret and print it
    Issue,

    /// Verify a token with the configured secret (exit code 1 on failure)
    Verify {
        /// Token to verify
        token: String,
    },

    /// Print a new random secret for csrf.secret
    GenerateSecret {
        /// Random bytes before encoding (at least 32)
        #[arg(long, default_value_t = CsrfSecret::MIN_LEN as u16,
              value_parser = clap::value_parser!(u16).range(CsrfSecret::MIN_LEN as i64..=1024))]
        bytes: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 未指定子命令时运行服务器
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
