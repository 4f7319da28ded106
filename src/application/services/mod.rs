//! Application Services
//!
//! - KeyLockRegistry: 按缓存 key 的互斥锁表
//! - RequestCoordinator: 按需取音频（命中直接返回，失效加锁合成）
//! - RegenerationEngine: 单条/批量强制再生成
//! - CacheMaintenance: 按龄淘汰与聚合统计

mod cache_maintenance;
mod key_locks;
mod regeneration_engine;
mod request_coordinator;

pub use cache_maintenance::{CacheMaintenance, CacheStatistics};
pub use key_locks::KeyLockRegistry;
pub use regeneration_engine::{BulkRegenerationResult, RegenerationEngine, RegenerationOutcome};
pub use request_coordinator::{GeneratedAudio, RequestCoordinator, RequestCounters};
