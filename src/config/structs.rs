use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AppError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，示例：CG__CSRF__SECRET=...
pub const ENV_PREFIX: &str = "CG";

/// 示例配置中的密钥占位符，长度不足，直接使用会在启动校验时失败
pub const SAMPLE_SECRET_PLACEHOLDER: &str = "<csrfgate generate-secret>";

/// CSRF Guard 工作模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CsrfMode {
    /// 自校验签名 token，无服务端状态
    #[default]
    Stateless,
    /// 服务端登记，token 只能使用一次
    OneTime,
}

impl fmt::Display for CsrfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless => write!(f, "stateless"),
            Self::OneTime => write!(f, "one_time"),
        }
    }
}

impl std::str::FromStr for CsrfMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "stateless" => Ok(Self::Stateless),
            "one_time" | "onetime" => Ok(Self::OneTime),
            _ => Err(format!(
                "Invalid CSRF mode: '{}'. Valid: stateless, one_time",
                s
            )),
        }
    }
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 优先级：ENV > config.toml > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub csrf: CsrfSettings,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 文件不存在时使用默认值；文件存在但无法解析时返回错误。
    /// ENV 前缀：CG，分隔符：__
    pub fn load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("csrf.exclude_paths")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// 示例配置：默认值 + 密钥占位符
    pub fn sample() -> Self {
        let mut sample_config = Self::default();
        sample_config.csrf.secret = SAMPLE_SECRET_PLACEHOLDER.to_string();
        sample_config
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::sample())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(AppError::from)
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 请求体上限（字节），同时限制中间件读取 body 字段时的缓冲大小
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// 路由前缀配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
}

/// CSRF 配置
#[derive(Clone, Serialize, Deserialize)]
pub struct CsrfSettings {
    /// HMAC 密钥（至少 32 字节）
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub mode: CsrfMode,
    #[serde(default = "default_header_name")]
    pub header_name: String,
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// 不做 CSRF 校验的路径前缀
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    /// one_time 模式下清理过期登记的间隔
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl fmt::Debug for CsrfSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfSettings")
            .field("secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("mode", &self.mode)
            .field("header_name", &self.header_name)
            .field("field_name", &self.field_name)
            .field("exclude_paths", &self.exclude_paths)
            .field("purge_interval_secs", &self.purge_interval_secs)
            .finish()
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// Token 签发端点限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_seconds_per_request")]
    pub seconds_per_request: u64,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

fn default_token_ttl_secs() -> u64 {
    1800
}

fn default_header_name() -> String {
    "X-CSRF-Token".to_string()
}

fn default_field_name() -> String {
    "csrf_token".to_string()
}

fn default_purge_interval_secs() -> u64 {
    60
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_seconds_per_request() -> u64 {
    1
}

fn default_burst_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            api_prefix: default_api_prefix(),
            health_prefix: default_health_prefix(),
        }
    }
}

impl Default for CsrfSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
            mode: CsrfMode::default(),
            header_name: default_header_name(),
            field_name: default_field_name(),
            exclude_paths: Vec::new(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            seconds_per_request: default_seconds_per_request(),
            burst_size: default_burst_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
