//! Token commands

use colored::Colorize;

use crate::config::{CsrfMode, StaticConfig};
use crate::csrf::{
    CsrfGuard, CsrfProtector, CsrfSecret, IssuedToken, VerifiedToken, ttl_from_secs,
};
use crate::interfaces::cli::CliError;

/// 按配置构建无状态 Guard
pub fn load_cli_guard(config: &StaticConfig) -> Result<CsrfGuard, CliError> {
    config.validate()?;

    if config.csrf.mode == CsrfMode::OneTime {
        eprintln!(
            "{}",
            "csrf.mode is one_time; CLI commands only check signature and expiry".yellow()
        );
    }

    let secret = CsrfSecret::new(config.csrf.secret.as_bytes().to_vec())?;
    let ttl = ttl_from_secs(config.csrf.token_ttl_secs)?;
    Ok(CsrfGuard::with_system_clock(&secret, ttl)?)
}

pub fn issue_with(config: &StaticConfig) -> Result<IssuedToken, CliError> {
    Ok(load_cli_guard(config)?.issue())
}

pub fn verify_with(config: &StaticConfig, token: &str) -> Result<VerifiedToken, CliError> {
    Ok(load_cli_guard(config)?.verify(Some(token))?)
}

/// 签发 token：stdout 只输出 token 本身，便于脚本捕获
pub fn issue_token(config_path: &str) -> Result<(), CliError> {
    let config = StaticConfig::load(config_path)?;
    let issued = issue_with(&config)?;

    println!("{}", issued.value);
    eprintln!(
        "{} {}",
        "expires at".dimmed(),
        issued.expires_at.to_rfc3339().blue()
    );
    Ok(())
}

pub fn verify_token(config_path: &str, token: &str) -> Result<(), CliError> {
    let config = StaticConfig::load(config_path)?;
    let verified = verify_with(&config, token)?;

    println!(
        "{} issued at {}, expires at {}",
        "Token valid:".green().bold(),
        verified.issued_at.to_rfc3339(),
        verified.expires_at.to_rfc3339()
    );
    Ok(())
}
