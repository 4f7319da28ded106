//! Request Coordinator - 按需取音频
//!
//! 命中走快速路径直接返回缓存字节；失效或缺失时进入按 key 的单航道：
//! 同一 key 的并发请求共享同一个在途合成，拿到同样的字节或同样的错误，
//! 而不是各自触发一次昂贵的 TTS 调用。在途合成由独立任务驱动到完成，
//! 发起方中途断开不会取消它。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::application::error::ApplicationError;
use crate::application::ports::{CacheEntry, CacheStorePort, SynthesisRequest, TtsClientPort};
use crate::application::services::KeyLockRegistry;
use crate::domain::speech::{fingerprint, is_stale, text_digest, Fingerprint, OwnerId, VoiceConfig};

/// 进程内命中/未命中计数
///
/// 统计估算用，进程重启即清零；没有观测值时命中率报告为不可得而不是 0
#[derive(Debug, Default)]
pub struct RequestCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RequestCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// (hits, misses) 快照
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

/// 生成结果：音频字节与其 MIME 类型
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub audio: Vec<u8>,
    pub mime_type: String,
}

/// 同一 key 的在途合成，所有等待方共享同一份结果
type GenerationFlight = Shared<BoxFuture<'static, Result<GeneratedAudio, ApplicationError>>>;

/// 请求协调器
pub struct RequestCoordinator {
    cache_store: Arc<dyn CacheStorePort>,
    tts_client: Arc<dyn TtsClientPort>,
    locks: Arc<KeyLockRegistry>,
    counters: Arc<RequestCounters>,
    inflight: Arc<DashMap<String, GenerationFlight>>,
}

impl RequestCoordinator {
    pub fn new(
        cache_store: Arc<dyn CacheStorePort>,
        tts_client: Arc<dyn TtsClientPort>,
        locks: Arc<KeyLockRegistry>,
        counters: Arc<RequestCounters>,
    ) -> Self {
        Self {
            cache_store,
            tts_client,
            locks,
            counters,
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// 取 owner 的音频；缓存新鲜则零合成调用返回，否则加入该 key 的在途合成
    pub async fn get_or_generate(
        &self,
        owner: &OwnerId,
        text: &str,
        voice: &VoiceConfig,
    ) -> Result<GeneratedAudio, ApplicationError> {
        if text.trim().is_empty() {
            return Err(ApplicationError::validation("Text cannot be empty"));
        }
        voice.validate().map_err(ApplicationError::validation)?;

        let key = fingerprint(text, voice);

        // 快速路径：当前条目仍新鲜则直接返回
        if let Some(entry) = self.cache_store.get_current(owner).await? {
            if !is_stale(Some(&entry.key), text, voice) {
                self.counters.record_hit();
                tracing::debug!(owner_id = %owner, cache_key = %key, "Cache hit");
                return Ok(GeneratedAudio {
                    audio: entry.audio,
                    mime_type: entry.mime_type,
                });
            }
        }
        self.counters.record_miss();

        self.join_generation(owner, text, voice, key).await
    }

    /// 加入（或发起）该 key 的在途合成
    fn flight_for(
        &self,
        owner: &OwnerId,
        text: &str,
        voice: &VoiceConfig,
        key: Fingerprint,
    ) -> GenerationFlight {
        use dashmap::mapref::entry::Entry;

        let key_str = key.as_str().to_string();

        // 候选航道是惰性 future：不被采用时无副作用
        let candidate: GenerationFlight = {
            let lock = self.locks.lock_for(&key_str);
            let cache_store = self.cache_store.clone();
            let tts_client = self.tts_client.clone();
            let owner = owner.clone();
            let text = text.to_string();
            let voice = voice.clone();

            async move {
                // 与 RegenerationEngine 共用同一把按 key 的锁，
                // 同一 owner 上的再生成与播放请求被线性化
                let _guard = lock.lock_owned().await;

                // 锁内按指纹复查：前一个持锁者或内容相同的另一 owner
                // 可能已写入同一指纹。指纹相同即内容相同，
                // 把本 owner 的 current 指向既有条目，不再合成
                if let Some(existing) = cache_store.get(&key).await? {
                    let result = GeneratedAudio {
                        audio: existing.audio.clone(),
                        mime_type: existing.mime_type.clone(),
                    };
                    let adopted = CacheEntry {
                        owner_id: owner.clone(),
                        ..existing
                    };
                    cache_store.put_current(adopted).await?;
                    tracing::debug!(
                        owner_id = %owner,
                        cache_key = %key,
                        "Adopted existing entry for fingerprint"
                    );
                    return Ok(result);
                }

                synthesize_and_store(&*cache_store, &*tts_client, &owner, &text, &voice, key).await
            }
            .boxed()
            .shared()
        };

        let (flight, created) = match self.inflight.entry(key_str.clone()) {
            // 仍在飞行中的航道直接加入
            Entry::Occupied(existing) if existing.get().peek().is_none() => {
                (existing.get().clone(), false)
            }
            // 已完成的航道是陈旧的：新请求重新检查缓存、必要时重新合成
            Entry::Occupied(mut existing) => {
                existing.insert(candidate.clone());
                (candidate, true)
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate.clone());
                (candidate, true)
            }
        };

        if created {
            // 守护任务把在途合成驱动到完成并清理登记表：
            // 即使所有发起方都断开，合成也会跑完并写入缓存
            let driver = flight.clone();
            let marker = flight.clone();
            let inflight = self.inflight.clone();
            tokio::spawn(async move {
                let _ = driver.await;
                inflight.remove_if(&key_str, |_, stored| stored.ptr_eq(&marker));
            });
        }

        flight
    }

    async fn join_generation(
        &self,
        owner: &OwnerId,
        text: &str,
        voice: &VoiceConfig,
        key: Fingerprint,
    ) -> Result<GeneratedAudio, ApplicationError> {
        tracing::debug!(owner_id = %owner, cache_key = %key, "Cache miss, joining generation flight");
        self.flight_for(owner, text, voice, key).await
    }
}

/// 合成一条音频并写入缓存
///
/// 失败时缓存不被触碰：旧条目（若有）原样保留
pub(crate) async fn synthesize_and_store(
    cache_store: &dyn CacheStorePort,
    tts_client: &dyn TtsClientPort,
    owner: &OwnerId,
    text: &str,
    voice: &VoiceConfig,
    key: Fingerprint,
) -> Result<GeneratedAudio, ApplicationError> {
    let started = Instant::now();

    let response = tts_client
        .synthesize(SynthesisRequest {
            text: text.to_string(),
            voice: voice.clone(),
        })
        .await?;

    let generation_duration_ms = started.elapsed().as_millis() as u64;

    let entry = CacheEntry {
        key: key.clone(),
        owner_id: owner.clone(),
        audio: response.audio.clone(),
        mime_type: response.mime_type.clone(),
        text_hash: text_digest(text),
        voice: voice.clone(),
        created_at: Utc::now(),
        generation_duration_ms,
    };
    cache_store.put_current(entry).await?;

    tracing::info!(
        owner_id = %owner,
        cache_key = %key,
        duration_ms = generation_duration_ms,
        audio_size = response.audio.len(),
        "Audio synthesized and cached"
    );

    Ok(GeneratedAudio {
        audio: response.audio,
        mime_type: response.mime_type,
    })
}
