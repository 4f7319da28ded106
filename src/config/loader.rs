//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `REVOICE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `REVOICE_SERVER__PORT=8080`
/// - `REVOICE_TTS__URL=http://tts-server:8000`
/// - `REVOICE_TTS__FAKE=true`
/// - `REVOICE_CACHE__PATH=/data/cache.sled`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 60)?
        .set_default("tts.fake", false)?
        .set_default("cache.path", "data/cache.sled")?
        .set_default("directory.path", "data/revoice.db")?
        .set_default("directory.max_connections", 5)?
        .set_default("maintenance.enabled", true)?
        .set_default("maintenance.interval_secs", 3600)?
        .set_default("maintenance.max_age_days", 90)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: REVOICE_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("REVOICE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if !config.tts.fake && config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.tts.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "TTS timeout cannot be 0".to_string(),
        ));
    }

    if config.directory.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Directory database path cannot be empty".to_string(),
        ));
    }

    if config.maintenance.enabled {
        if config.maintenance.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Maintenance interval cannot be 0 when maintenance is enabled".to_string(),
            ));
        }
        if config.maintenance.max_age_days == 0 {
            return Err(ConfigError::ValidationError(
                "Maintenance max age cannot be 0 days when maintenance is enabled".to_string(),
            ));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("TTS Fake Mode: {}", config.tts.fake);
    tracing::info!("Cache Path: {:?}", config.cache.path);
    tracing::info!("Directory DB: {}", config.directory.path);
    tracing::info!("Maintenance Enabled: {}", config.maintenance.enabled);
    if config.maintenance.enabled {
        tracing::info!("Maintenance Interval: {}s", config.maintenance.interval_secs);
        tracing::info!("Max Entry Age: {} days", config.maintenance.max_age_days);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
