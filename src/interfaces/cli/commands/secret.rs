//! Generate secret command

use colored::Colorize;

use crate::csrf::CsrfSecret;
use crate::interfaces::cli::CliError;

/// 打印新的随机密钥（URL-safe Base64）
pub fn generate_secret(bytes: usize) -> Result<(), CliError> {
    let secret = CsrfSecret::generate(bytes)?;
    println!("{}", secret.to_base64());
    eprintln!(
        "{} {}",
        "Set it as csrf.secret or".dimmed(),
        "CG__CSRF__SECRET".yellow()
    );
    Ok(())
}
