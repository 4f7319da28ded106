//! Sled-based Cache Store Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{CacheEntry, CacheEntryMeta, CacheError, CacheStorePort};
use crate::domain::speech::{Fingerprint, OwnerId, VoiceConfig};

/// 条目记录的 keyspace
const ENTRY_PREFIX: &str = "entry:";
/// owner → 当前条目指纹 的 keyspace
const CURRENT_PREFIX: &str = "current:";

/// Sled 缓存配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/cache.sled".to_string(),
        }
    }
}

/// 内部存储记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    owner_id: String,
    audio: Vec<u8>,
    mime_type: String,
    text_hash: String,
    voice_id: String,
    stability: f32,
    similarity: f32,
    style: f32,
    speed: f32,
    created_at_ms: i64,
    generation_duration_ms: u64,
}

impl From<&CacheEntry> for StoredEntry {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            key: entry.key.as_str().to_string(),
            owner_id: entry.owner_id.as_str().to_string(),
            audio: entry.audio.clone(),
            mime_type: entry.mime_type.clone(),
            text_hash: entry.text_hash.clone(),
            voice_id: entry.voice.voice_id.clone(),
            stability: entry.voice.stability,
            similarity: entry.voice.similarity,
            style: entry.voice.style,
            speed: entry.voice.speed,
            created_at_ms: entry.created_at.timestamp_millis(),
            generation_duration_ms: entry.generation_duration_ms,
        }
    }
}

impl StoredEntry {
    fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.created_at_ms).unwrap_or_else(Utc::now)
    }

    fn into_entry(self) -> CacheEntry {
        let created_at = self.created_at();
        CacheEntry {
            key: Fingerprint::from_hex(self.key),
            owner_id: OwnerId::new(self.owner_id),
            audio: self.audio,
            mime_type: self.mime_type,
            text_hash: self.text_hash,
            voice: VoiceConfig {
                voice_id: self.voice_id,
                stability: self.stability,
                similarity: self.similarity,
                style: self.style,
                speed: self.speed,
            },
            created_at,
            generation_duration_ms: self.generation_duration_ms,
        }
    }

    fn into_meta(self) -> CacheEntryMeta {
        let created_at = self.created_at();
        CacheEntryMeta {
            key: Fingerprint::from_hex(self.key),
            owner_id: OwnerId::new(self.owner_id),
            text_hash: self.text_hash,
            size_bytes: self.audio.len() as u64,
            created_at,
            generation_duration_ms: self.generation_duration_ms,
        }
    }
}

/// Sled 音频缓存存储
pub struct SledCacheStore {
    db: Db,
}

impl SledCacheStore {
    /// 创建新的存储实例
    pub fn new(config: &SledStoreConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::info!(db_path = %config.db_path, "SledCacheStore initialized");

        Ok(Self { db })
    }

    /// 打开指定路径的存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn entry_key(key: &Fingerprint) -> String {
        format!("{}{}", ENTRY_PREFIX, key)
    }

    fn current_key(owner: &OwnerId) -> String {
        format!("{}{}", CURRENT_PREFIX, owner)
    }

    fn decode(data: &[u8]) -> Result<StoredEntry, CacheError> {
        bincode::deserialize(data).map_err(|e| CacheError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl CacheStorePort for SledCacheStore {
    async fn put_current(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let stored = StoredEntry::from(&entry);
        let bytes =
            bincode::serialize(&stored).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        // 条目先落盘，指针后切换：并发读要么看到旧条目要么看到新条目
        self.db
            .insert(Self::entry_key(&entry.key), bytes)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        self.db
            .insert(
                Self::current_key(&entry.owner_id),
                entry.key.as_str().as_bytes(),
            )
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        tracing::debug!(
            cache_key = %entry.key,
            owner_id = %entry.owner_id,
            size_bytes = entry.size_bytes(),
            "Cache entry stored"
        );

        Ok(())
    }

    async fn get_current(&self, owner: &OwnerId) -> Result<Option<CacheEntry>, CacheError> {
        let pointer = self
            .db
            .get(Self::current_key(owner))
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        let Some(pointer) = pointer else {
            return Ok(None);
        };
        let key_str = String::from_utf8(pointer.to_vec())
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        match self
            .db
            .get(format!("{}{}", ENTRY_PREFIX, key_str))
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?
        {
            Some(data) => Ok(Some(Self::decode(&data)?.into_entry())),
            None => {
                // 指针悬空：条目被并发淘汰，按未命中处理
                tracing::debug!(owner_id = %owner, cache_key = %key_str, "Dangling current pointer");
                Ok(None)
            }
        }
    }

    async fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        match self
            .db
            .get(Self::entry_key(key))
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?
        {
            Some(data) => Ok(Some(Self::decode(&data)?.into_entry())),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &Fingerprint) -> Result<bool, CacheError> {
        let removed = self
            .db
            .remove(Self::entry_key(key))
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        let Some(data) = removed else {
            return Ok(false);
        };

        // 若 current 指针还指向被删条目，一并清除
        if let Ok(stored) = Self::decode(&data) {
            let current_key = format!("{}{}", CURRENT_PREFIX, stored.owner_id);
            if let Ok(Some(pointer)) = self.db.get(&current_key) {
                if pointer.as_ref() == key.as_str().as_bytes() {
                    let _ = self.db.remove(&current_key);
                }
            }
        }

        tracing::debug!(cache_key = %key, "Cache entry removed");
        Ok(true)
    }

    async fn scan_meta(&self) -> Result<Vec<CacheEntryMeta>, CacheError> {
        let mut metas = Vec::new();
        for item in self.db.scan_prefix(ENTRY_PREFIX) {
            let (key, value) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            match Self::decode(&value) {
                Ok(stored) => metas.push(stored.into_meta()),
                Err(e) => {
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "Skipping undecodable cache entry"
                    );
                }
            }
        }
        Ok(metas)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::domain::speech::{fingerprint, text_digest};

    fn test_store(dir: &tempfile::TempDir) -> SledCacheStore {
        let config = SledStoreConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
        };
        SledCacheStore::new(&config).unwrap()
    }

    fn make_entry(owner: &str, text: &str, voice: &VoiceConfig) -> CacheEntry {
        CacheEntry {
            key: fingerprint(text, voice),
            owner_id: OwnerId::new(owner),
            audio: text.as_bytes().to_vec(),
            mime_type: "audio/mpeg".to_string(),
            text_hash: text_digest(text),
            voice: voice.clone(),
            created_at: Utc::now(),
            generation_duration_ms: 42,
        }
    }

    #[tokio::test]
    async fn test_put_and_get_current() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        let entry = make_entry("msg_1", "Hello", &VoiceConfig::default());
        let key = entry.key.clone();
        store.put_current(entry).await.unwrap();

        let current = store
            .get_current(&OwnerId::new("msg_1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.key, key);
        assert_eq!(current.audio, b"Hello");
        assert_eq!(current.generation_duration_ms, 42);

        let by_key = store.get(&key).await.unwrap().unwrap();
        assert_eq!(by_key.audio, b"Hello");
    }

    #[tokio::test]
    async fn test_supersede_keeps_historical_entry() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let voice = VoiceConfig::default();

        let old = make_entry("msg_1", "Version one", &voice);
        let old_key = old.key.clone();
        store.put_current(old).await.unwrap();

        let new = make_entry("msg_1", "Version two", &voice);
        let new_key = new.key.clone();
        store.put_current(new).await.unwrap();

        // current 指向新条目，旧条目保留为历史行
        let current = store
            .get_current(&OwnerId::new("msg_1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.key, new_key);
        assert!(store.get(&old_key).await.unwrap().is_some());
        assert_eq!(store.scan_meta().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_clears_current_pointer() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        let entry = make_entry("msg_1", "Hello", &VoiceConfig::default());
        let key = entry.key.clone();
        store.put_current(entry).await.unwrap();

        assert!(store.remove(&key).await.unwrap());
        assert!(store.get_current(&OwnerId::new("msg_1")).await.unwrap().is_none());
        assert!(store.get(&key).await.unwrap().is_none());

        // 再删一次：干净返回 false
        assert!(!store.remove(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_historical_entry_keeps_current() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let voice = VoiceConfig::default();

        let old = make_entry("msg_1", "Version one", &voice);
        let old_key = old.key.clone();
        store.put_current(old).await.unwrap();

        let new = make_entry("msg_1", "Version two", &voice);
        let new_key = new.key.clone();
        store.put_current(new).await.unwrap();

        // 删除历史条目不影响 current 指针
        assert!(store.remove(&old_key).await.unwrap());
        let current = store
            .get_current(&OwnerId::new("msg_1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.key, new_key);
    }

    #[tokio::test]
    async fn test_scan_meta_reports_sizes() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let voice = VoiceConfig::default();

        store
            .put_current(make_entry("a", "12345", &voice))
            .await
            .unwrap();
        store
            .put_current(make_entry("b", "1234567890", &voice))
            .await
            .unwrap();

        let mut sizes: Vec<u64> = store
            .scan_meta()
            .await
            .unwrap()
            .iter()
            .map(|m| m.size_bytes)
            .collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![5, 10]);
    }
}
