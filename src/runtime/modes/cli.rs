//! CLI mode

use crate::cli::Commands;
use crate::interfaces::cli::CliError;

/// Run CLI mode
pub fn run_cli(command: Commands, config_path: &str) -> Result<(), CliError> {
    crate::interfaces::cli::run_cli_command(command, config_path)
}
