//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音频缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 消息目录配置
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// 维护配置
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 使用 Fake 客户端（演示/联调，不访问真实服务）
    #[serde(default)]
    pub fake: bool,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            fake: false,
        }
    }
}

/// 音频缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Sled 数据库路径
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/cache.sled")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

/// 消息目录配置
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// SQLite 数据库文件路径
    #[serde(default = "default_directory_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_directory_path() -> String {
    "data/revoice.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            path: default_directory_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DirectoryConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 维护配置（定期按龄淘汰）
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceConfig {
    /// 是否启用定期淘汰
    #[serde(default = "default_maintenance_enabled")]
    pub enabled: bool,

    /// 淘汰间隔（秒）
    #[serde(default = "default_maintenance_interval")]
    pub interval_secs: u64,

    /// 条目最大年龄（天）
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
}

fn default_maintenance_enabled() -> bool {
    true
}

fn default_maintenance_interval() -> u64 {
    3600 // 1 小时
}

fn default_max_age_days() -> u32 {
    90
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: default_maintenance_enabled(),
            interval_secs: default_maintenance_interval(),
            max_age_days: default_max_age_days(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5070);
        assert_eq!(config.tts.url, "http://localhost:8000");
        assert!(!config.tts.fake);
        assert_eq!(config.directory.path, "data/revoice.db");
        assert_eq!(config.maintenance.max_age_days, 90);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5070");
    }

    #[test]
    fn test_database_url() {
        let config = DirectoryConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/revoice.db?mode=rwc");
    }
}
