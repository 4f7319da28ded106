//! Revoice - TTS 音频缓存与再生成系统
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Speech Context: 缓存指纹、音色配置、新鲜度判定（纯函数，无 I/O）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（CacheStore, TtsClient, MessageDirectory）
//! - Services: RequestCoordinator（按需取音频，按 key 并发收敛）、
//!   RegenerationEngine（单条/批量强制再生成）、CacheMaintenance（按龄淘汰与统计）
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful 管理 API
//! - Persistence: Sled 音频缓存 + SQLite 消息目录
//! - Adapters: TTS Client（HTTP / Fake）
//! - Memory: 消息目录内存实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
