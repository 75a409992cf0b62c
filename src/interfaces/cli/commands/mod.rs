mod config_gen;
mod secret;
mod token;

pub use config_gen::config_generate;
pub use secret::generate_secret;
pub use token::{issue_token, issue_with, load_cli_guard, verify_token, verify_with};
