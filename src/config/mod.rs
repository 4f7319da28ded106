//! Configuration

mod loader;
mod types;

use std::sync::Once;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, CacheConfig, DirectoryConfig, LogConfig, MaintenanceConfig, ServerConfig, TtsConfig,
};

/// 安装全局 tracing 订阅器
///
/// 进程级一次性初始化：重复或并发调用是无害的空操作
pub fn init_tracing(log: &LogConfig) {
    static INIT: Once = Once::new();

    let filter = format!("{},revoice={},tower_http=info", log.level, log.level);
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
            )
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let log = LogConfig::default();
        init_tracing(&log);
        // 第二次调用不得 panic（订阅器只装一次）
        init_tracing(&log);
    }
}
