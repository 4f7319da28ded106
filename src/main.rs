//! Revoice - TTS 音频缓存与再生成系统
//!
//! - Domain: speech/ (指纹、新鲜度)
//! - Application: ports + services (RequestCoordinator, RegenerationEngine, CacheMaintenance)
//! - Infrastructure: http, persistence (sled + sqlite), adapters (tts), memory

use std::sync::Arc;
use std::time::Duration;

use revoice::application::{
    CacheMaintenance, CacheStorePort, KeyLockRegistry, MessageDirectoryPort, RegenerationEngine,
    RequestCoordinator, RequestCounters, TtsClientPort,
};
use revoice::config::{init_tracing, load_config, print_config};
use revoice::infrastructure::adapters::{
    FakeTtsClient, HttpTtsClient, HttpTtsClientConfig,
};
use revoice::infrastructure::http::{AppState, HttpServer, ServerConfig};
use revoice::infrastructure::persistence::sled::{SledCacheStore, SledStoreConfig};
use revoice::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteMessageDirectory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    init_tracing(&config.log);

    tracing::info!("Revoice - TTS 音频缓存与再生成系统");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.directory.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = config.cache.path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化消息目录（SQLite）
    let db_config = DatabaseConfig {
        database_url: config.directory.database_url(),
        max_connections: config.directory.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    let directory: Arc<dyn MessageDirectoryPort> = Arc::new(SqliteMessageDirectory::new(pool));

    // 初始化音频缓存（Sled）
    let store_config = SledStoreConfig {
        db_path: config.cache.path.to_string_lossy().to_string(),
    };
    let cache_store = SledCacheStore::new(&store_config)?.arc();

    // 创建 TTS 客户端
    let tts_client: Arc<dyn TtsClientPort> = if config.tts.fake {
        Arc::new(FakeTtsClient::with_defaults())
    } else {
        let tts_config = HttpTtsClientConfig {
            base_url: config.tts.url.clone(),
            timeout_secs: config.tts.timeout_secs,
        };
        Arc::new(HttpTtsClient::new(tts_config)?)
    };

    // 组装服务：锁表与计数器在 coordinator / engine / maintenance 之间共享
    let locks = KeyLockRegistry::new().arc();
    let counters = Arc::new(RequestCounters::default());
    let coordinator = Arc::new(RequestCoordinator::new(
        cache_store.clone(),
        tts_client.clone(),
        locks.clone(),
        counters.clone(),
    ));
    let regeneration = Arc::new(RegenerationEngine::new(
        directory.clone(),
        cache_store.clone(),
        tts_client.clone(),
        locks,
    ));
    let maintenance = Arc::new(CacheMaintenance::new(cache_store.clone(), counters));

    // 定期按龄淘汰
    if config.maintenance.enabled {
        let sweep = maintenance.clone();
        let interval_secs = config.maintenance.interval_secs;
        let max_age_days = config.maintenance.max_age_days;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // 跳过启动时的首次立即触发
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match sweep.clear_older_than(max_age_days).await {
                    Ok(removed) if removed > 0 => {
                        tracing::info!(removed, "Periodic cache eviction");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Periodic cache eviction failed");
                    }
                }
            }
        });
    }

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        coordinator,
        regeneration,
        maintenance,
        directory,
        tts_client,
    );
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    // 缓存落盘后退出
    cache_store.flush().await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
