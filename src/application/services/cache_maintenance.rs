//! Cache Maintenance - 按龄淘汰与聚合统计
//!
//! 淘汰是存储管理手段，与新鲜度失效无关：过期条目即使是 current 也会被删，
//! 用可重放性换存储空间；需要保证可用性的调用方应随后再生成。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::CacheStorePort;
use crate::application::services::RequestCounters;

/// 缓存聚合统计
///
/// 取不到的值显式置 None（序列化为 null），绝不伪造为零：
/// "缓存为空" 与 "统计不可得" 是两回事
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatistics {
    pub total_entries: usize,
    pub total_bytes: u64,
    pub average_generation_duration_ms: Option<f64>,
    pub oldest_created_at: Option<DateTime<Utc>>,
    pub newest_created_at: Option<DateTime<Utc>>,
    /// 进程启动以来的命中率估算；没有观测到任何请求时为 None
    pub hit_rate_estimate: Option<f64>,
}

/// 缓存维护服务
pub struct CacheMaintenance {
    cache_store: Arc<dyn CacheStorePort>,
    counters: Arc<RequestCounters>,
}

impl CacheMaintenance {
    pub fn new(cache_store: Arc<dyn CacheStorePort>, counters: Arc<RequestCounters>) -> Self {
        Self {
            cache_store,
            counters,
        }
    }

    /// 删除创建时间早于 now - days 的条目，返回删除数量
    ///
    /// 与并发读写竞争是安全的：单条删除的原子性由存储层保证，
    /// 竞争中的读要么取到旧字节要么干净未命中
    pub async fn clear_older_than(&self, days: u32) -> Result<u64, ApplicationError> {
        let cutoff = Utc::now() - Duration::days(days as i64);
        let metas = self.cache_store.scan_meta().await?;

        let mut removed = 0u64;
        for meta in metas {
            if meta.created_at < cutoff && self.cache_store.remove(&meta.key).await? {
                removed += 1;
            }
        }

        tracing::info!(days, removed, "Cache eviction completed");
        Ok(removed)
    }

    /// 汇总缓存统计
    pub async fn compute_statistics(&self) -> Result<CacheStatistics, ApplicationError> {
        let metas = self.cache_store.scan_meta().await?;

        let total_entries = metas.len();
        let total_bytes = metas.iter().map(|m| m.size_bytes).sum();
        let average_generation_duration_ms = if metas.is_empty() {
            None
        } else {
            Some(
                metas
                    .iter()
                    .map(|m| m.generation_duration_ms as f64)
                    .sum::<f64>()
                    / metas.len() as f64,
            )
        };
        let oldest_created_at = metas.iter().map(|m| m.created_at).min();
        let newest_created_at = metas.iter().map(|m| m.created_at).max();

        let (hits, misses) = self.counters.snapshot();
        let observed = hits + misses;
        let hit_rate_estimate = if observed == 0 {
            None
        } else {
            Some(hits as f64 / observed as f64)
        };

        Ok(CacheStatistics {
            total_entries,
            total_bytes,
            average_generation_duration_ms,
            oldest_created_at,
            newest_created_at,
            hit_rate_estimate,
        })
    }
}
