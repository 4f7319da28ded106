//! Regeneration Engine - 强制再生成
//!
//! 单条：无论当前缓存是否新鲜都重新合成（运维场景，例如换音色后刷新）。
//! 批量：按输入顺序逐条执行，单条失败只计入汇总，绝不中断整批。
//! 与 RequestCoordinator 共用同一把按 key 的锁，再生成与并发播放请求
//! 在同一 owner 上被线性化。

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::application::error::ApplicationError;
use crate::application::ports::{CacheStorePort, MessageDirectoryPort, TtsClientPort};
use crate::application::services::request_coordinator::synthesize_and_store;
use crate::application::services::KeyLockRegistry;
use crate::domain::speech::{fingerprint, OwnerId};

/// 单条再生成的结果
#[derive(Debug, Clone, Serialize)]
pub struct RegenerationOutcome {
    pub owner_id: OwnerId,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl RegenerationOutcome {
    fn success(owner_id: OwnerId, duration_ms: u64) -> Self {
        Self {
            owner_id,
            succeeded: true,
            error: None,
            duration_ms,
        }
    }

    fn failure(owner_id: OwnerId, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            owner_id,
            succeeded: false,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// 批量再生成的汇总
///
/// 批次不是事务：部分完成是正常的、可上报的结果
#[derive(Debug, Clone, Serialize)]
pub struct BulkRegenerationResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 按输入顺序排列的逐条结果
    pub outcomes: Vec<RegenerationOutcome>,
}

impl BulkRegenerationResult {
    /// 失败子集
    pub fn failures(&self) -> impl Iterator<Item = &RegenerationOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}

/// 再生成引擎
pub struct RegenerationEngine {
    directory: Arc<dyn MessageDirectoryPort>,
    cache_store: Arc<dyn CacheStorePort>,
    tts_client: Arc<dyn TtsClientPort>,
    locks: Arc<KeyLockRegistry>,
}

impl RegenerationEngine {
    pub fn new(
        directory: Arc<dyn MessageDirectoryPort>,
        cache_store: Arc<dyn CacheStorePort>,
        tts_client: Arc<dyn TtsClientPort>,
        locks: Arc<KeyLockRegistry>,
    ) -> Self {
        Self {
            directory,
            cache_store,
            tts_client,
            locks,
        }
    }

    /// 强制重新合成一条消息
    ///
    /// 失败时旧条目原样保留：只要之前有音频，失败的再生成绝不会让消息失声
    pub async fn regenerate_one(&self, owner: &OwnerId) -> RegenerationOutcome {
        let started = Instant::now();

        let message = match self.directory.find(owner).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                return RegenerationOutcome::failure(
                    owner.clone(),
                    format!("Message not found: {}", owner),
                    elapsed_ms(started),
                );
            }
            Err(e) => {
                return RegenerationOutcome::failure(
                    owner.clone(),
                    format!("Directory error: {}", e),
                    elapsed_ms(started),
                );
            }
        };

        if message.text.trim().is_empty() {
            return RegenerationOutcome::failure(
                owner.clone(),
                "Invalid input: text is empty",
                elapsed_ms(started),
            );
        }
        if let Err(e) = message.voice.validate() {
            return RegenerationOutcome::failure(
                owner.clone(),
                format!("Invalid input: {}", e),
                elapsed_ms(started),
            );
        }

        let key = fingerprint(&message.text, &message.voice);
        let lock = self.locks.lock_for(key.as_str());
        let cache_store = self.cache_store.clone();
        let tts_client = self.tts_client.clone();
        let task_owner = owner.clone();

        // 与 RequestCoordinator 相同的持锁方式；发起方取消不影响在途合成。
        // 不做新鲜度判断：强制再生成总是调用 TTS
        let task = tokio::spawn(async move {
            let _guard = lock.lock_owned().await;
            synthesize_and_store(
                &*cache_store,
                &*tts_client,
                &task_owner,
                &message.text,
                &message.voice,
                key,
            )
            .await
        });

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(ApplicationError::internal(format!(
                "Regeneration task aborted: {}",
                e
            ))),
        };

        match result {
            Ok(_) => {
                tracing::info!(owner_id = %owner, "Regeneration succeeded");
                RegenerationOutcome::success(owner.clone(), elapsed_ms(started))
            }
            Err(e) => {
                tracing::warn!(owner_id = %owner, error = %e, "Regeneration failed");
                RegenerationOutcome::failure(owner.clone(), e.to_string(), elapsed_ms(started))
            }
        }
    }

    /// 按给定顺序逐条强制再生成
    ///
    /// 逐条结果的顺序与输入一致，可复现
    pub async fn regenerate_all(&self, owner_ids: &[OwnerId]) -> BulkRegenerationResult {
        let total = owner_ids.len();
        tracing::info!(total, "Bulk regeneration started");

        let mut outcomes = Vec::with_capacity(total);
        for owner in owner_ids {
            outcomes.push(self.regenerate_one(owner).await);
        }

        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let failed = total - succeeded;
        tracing::info!(total, succeeded, failed, "Bulk regeneration finished");

        BulkRegenerationResult {
            total,
            succeeded,
            failed,
            outcomes,
        }
    }

    /// 对目录中的全部消息做批量再生成
    pub async fn regenerate_corpus(&self) -> Result<BulkRegenerationResult, ApplicationError> {
        let owners = self.directory.list_owner_ids().await?;
        Ok(self.regenerate_all(&owners).await)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    use crate::application::ports::{
        SpokenMessage, SynthesisRequest, SynthesisResponse, TtsError,
    };
    use crate::domain::speech::VoiceConfig;
    use crate::infrastructure::memory::InMemoryMessageDirectory;
    use crate::infrastructure::persistence::sled::{SledCacheStore, SledStoreConfig};

    /// 对指定文本固定失败的 TTS 测试替身
    struct FlakyTtsClient {
        calls: AtomicUsize,
        fail_texts: HashSet<String>,
    }

    impl FlakyTtsClient {
        fn new(fail_texts: impl IntoIterator<Item = String>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_texts: fail_texts.into_iter().collect(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TtsClientPort for FlakyTtsClient {
        async fn synthesize(
            &self,
            request: SynthesisRequest,
        ) -> Result<SynthesisResponse, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_texts.contains(&request.text) {
                return Err(TtsError::Provider("voice backend unavailable".to_string()));
            }
            Ok(SynthesisResponse {
                audio: fingerprint(&request.text, &request.voice)
                    .as_str()
                    .as_bytes()
                    .to_vec(),
                mime_type: "audio/mpeg".to_string(),
            })
        }
    }

    struct Harness {
        engine: RegenerationEngine,
        directory: Arc<InMemoryMessageDirectory>,
        store: Arc<SledCacheStore>,
        tts: Arc<FlakyTtsClient>,
        _dir: tempfile::TempDir,
    }

    fn build_engine(fail_texts: impl IntoIterator<Item = String>) -> Harness {
        let dir = tempdir().unwrap();
        let config = SledStoreConfig {
            db_path: dir.path().join("cache.sled").to_string_lossy().to_string(),
        };
        let store = Arc::new(SledCacheStore::new(&config).unwrap());
        let directory = Arc::new(InMemoryMessageDirectory::new());
        let tts = Arc::new(FlakyTtsClient::new(fail_texts));
        let engine = RegenerationEngine::new(
            directory.clone(),
            store.clone(),
            tts.clone(),
            KeyLockRegistry::new().arc(),
        );
        Harness {
            engine,
            directory,
            store,
            tts,
            _dir: dir,
        }
    }

    async fn seed_message(directory: &InMemoryMessageDirectory, owner: &str, text: &str) {
        directory
            .upsert(SpokenMessage::new(
                OwnerId::new(owner),
                text,
                VoiceConfig::default(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_regenerate_one_forces_synthesis_even_when_fresh() {
        let h = build_engine([]);
        seed_message(&h.directory, "msg_1", "Hello there").await;

        let first = h.engine.regenerate_one(&OwnerId::new("msg_1")).await;
        assert!(first.succeeded);
        assert_eq!(h.tts.call_count(), 1);

        // 条目仍然新鲜，但强制再生成还是要打一次 TTS
        let second = h.engine.regenerate_one(&OwnerId::new("msg_1")).await;
        assert!(second.succeeded);
        assert_eq!(h.tts.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_regeneration_preserves_previous_audio() {
        let h = build_engine([]);
        seed_message(&h.directory, "msg_1", "Hello there").await;

        let owner = OwnerId::new("msg_1");
        assert!(h.engine.regenerate_one(&owner).await.succeeded);
        let before = h.store.get_current(&owner).await.unwrap().unwrap();

        // 文本改为会失败的那条，再生成失败后旧音频仍可取
        seed_message(&h.directory, "msg_1", "doomed text").await;
        let h2_fail = FlakyTtsClient::new(["doomed text".to_string()]);
        let engine = RegenerationEngine::new(
            h.directory.clone(),
            h.store.clone(),
            Arc::new(h2_fail),
            KeyLockRegistry::new().arc(),
        );

        let outcome = engine.regenerate_one(&owner).await;
        assert!(!outcome.succeeded);
        assert!(outcome.error.as_deref().unwrap().contains("unavailable"));

        let after = h.store.get_current(&owner).await.unwrap().unwrap();
        assert_eq!(before.audio, after.audio);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_a_failed_outcome() {
        let h = build_engine([]);
        let outcome = h.engine.regenerate_one(&OwnerId::new("ghost")).await;
        assert!(!outcome.succeeded);
        assert!(outcome.error.as_deref().unwrap().contains("not found"));
        assert_eq!(h.tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid_input_without_tts_call() {
        let h = build_engine([]);
        seed_message(&h.directory, "msg_blank", "   ").await;

        let outcome = h.engine.regenerate_one(&OwnerId::new("msg_blank")).await;
        assert!(!outcome.succeeded);
        assert!(outcome.error.as_deref().unwrap().contains("Invalid input"));
        assert_eq!(h.tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bulk_reports_partial_failure_without_aborting() {
        let failing: Vec<String> = [2usize, 5, 7]
            .iter()
            .map(|i| format!("message {}", i))
            .collect();
        let h = build_engine(failing.clone());

        let mut owners = Vec::new();
        for i in 0..10 {
            let owner = format!("msg_{}", i);
            seed_message(&h.directory, &owner, &format!("message {}", i)).await;
            owners.push(OwnerId::new(owner));
        }

        let result = h.engine.regenerate_all(&owners).await;
        assert_eq!(result.total, 10);
        assert_eq!(result.succeeded, 7);
        assert_eq!(result.failed, 3);

        let failed_owners: Vec<&str> = result
            .failures()
            .map(|o| o.owner_id.as_str())
            .collect();
        assert_eq!(failed_owners, vec!["msg_2", "msg_5", "msg_7"]);
        assert!(result.failures().all(|o| o.error.is_some()));
    }

    #[tokio::test]
    async fn test_bulk_outcomes_follow_input_order() {
        let h = build_engine([]);
        for owner in ["b", "a", "c"] {
            seed_message(&h.directory, owner, "some text").await;
        }

        let owners: Vec<OwnerId> = ["b", "a", "c"].iter().map(|s| OwnerId::new(*s)).collect();
        let result = h.engine.regenerate_all(&owners).await;

        let reported: Vec<&str> = result.outcomes.iter().map(|o| o.owner_id.as_str()).collect();
        assert_eq!(reported, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_regenerate_corpus_walks_directory() {
        let h = build_engine([]);
        seed_message(&h.directory, "msg_a", "first").await;
        seed_message(&h.directory, "msg_b", "second").await;

        let result = h.engine.regenerate_corpus().await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.succeeded, 2);
        assert_eq!(h.tts.call_count(), 2);
    }
}
