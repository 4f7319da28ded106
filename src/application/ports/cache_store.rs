//! Cache Store Port - 音频缓存存储
//!
//! 定义缓存条目的持久化抽象，具体实现使用 Sled

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::speech::{Fingerprint, OwnerId, VoiceConfig};

/// Cache Store 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 缓存条目
///
/// audio 一经写入不可变；同一槽位的重新合成产生新条目并切换 current 指针
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// 缓存指纹，由 (文本, 音色配置) 派生
    pub key: Fingerprint,
    /// 所属消息槽位
    pub owner_id: OwnerId,
    /// 音频负载
    pub audio: Vec<u8>,
    /// MIME 类型（整个系统按单一格式假设处理，不做转码）
    pub mime_type: String,
    /// 合成时所用文本的摘要
    pub text_hash: String,
    /// 合成时所用的音色配置
    pub voice: VoiceConfig,
    /// 创建时间，由写入方设置
    pub created_at: DateTime<Utc>,
    /// 本次合成耗时（毫秒），用于性能统计
    pub generation_duration_ms: u64,
}

impl CacheEntry {
    pub fn size_bytes(&self) -> u64 {
        self.audio.len() as u64
    }
}

/// 缓存条目元数据
///
/// 不含音频负载，统计与淘汰扫描用
#[derive(Debug, Clone)]
pub struct CacheEntryMeta {
    pub key: Fingerprint,
    pub owner_id: OwnerId,
    pub text_hash: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub generation_duration_ms: u64,
}

/// Cache Store Port
///
/// - 每个 owner 至多一条 current 条目，由 `put_current` 原子切换
/// - 被替换的旧条目保留为历史行，直到被按龄淘汰或显式删除
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// 写入条目并把 owner 的 current 指针切到它
    ///
    /// 单条写入是全有或全无的：失败不会破坏既有条目
    async fn put_current(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// 取 owner 的当前条目
    ///
    /// 指针悬空（条目被并发删除）按未命中处理，绝不返回半删除的数据
    async fn get_current(&self, owner: &OwnerId) -> Result<Option<CacheEntry>, CacheError>;

    /// 按指纹取条目（含历史条目）
    async fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, CacheError>;

    /// 删除条目，返回是否确实存在
    ///
    /// 若 owner 的 current 指针指向该条目，一并清除指针
    async fn remove(&self, key: &Fingerprint) -> Result<bool, CacheError>;

    /// 扫描全部条目的元数据
    async fn scan_meta(&self) -> Result<Vec<CacheEntryMeta>, CacheError>;

    /// 刷新到磁盘
    async fn flush(&self) -> Result<(), CacheError>;
}
