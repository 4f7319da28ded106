//! Fake TTS Client - 测试与演示用
//!
//! 不访问外部服务，由请求内容确定性地派生音频字节：
//! 同样的 (文本, 音色配置) 必然得到同样的"音频"

use async_trait::async_trait;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsClientPort, TtsError};
use crate::domain::speech::fingerprint;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每条音频的字节长度
    pub audio_len: usize,
    /// 模拟合成延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            audio_len: 4096,
            latency_ms: 50,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            audio_len = config.audio_len,
            latency_ms = config.latency_ms,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }
}

#[async_trait]
impl TtsClientPort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        if request.text.trim().is_empty() {
            return Err(TtsError::InvalidInput("text is empty".to_string()));
        }

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        // 用指纹字节循环填充到目标长度
        let seed = fingerprint(&request.text, &request.voice);
        let seed_bytes = seed.as_str().as_bytes();
        let audio: Vec<u8> = seed_bytes
            .iter()
            .cycle()
            .take(self.config.audio_len)
            .copied()
            .collect();

        tracing::debug!(
            text_len = request.text.len(),
            voice_id = %request.voice.voice_id,
            audio_size = audio.len(),
            "FakeTtsClient: returning synthetic audio"
        );

        Ok(SynthesisResponse {
            audio,
            mime_type: "audio/mpeg".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::VoiceConfig;

    #[tokio::test]
    async fn test_same_input_same_audio() {
        let client = FakeTtsClient::new(FakeTtsClientConfig {
            audio_len: 128,
            latency_ms: 0,
        });
        let request = SynthesisRequest {
            text: "Hello".to_string(),
            voice: VoiceConfig::default(),
        };

        let a = client.synthesize(request.clone()).await.unwrap();
        let b = client.synthesize(request).await.unwrap();
        assert_eq!(a.audio, b.audio);
        assert_eq!(a.audio.len(), 128);
    }

    #[tokio::test]
    async fn test_different_voice_different_audio() {
        let client = FakeTtsClient::new(FakeTtsClientConfig {
            audio_len: 128,
            latency_ms: 0,
        });

        let mut voice = VoiceConfig::default();
        let a = client
            .synthesize(SynthesisRequest {
                text: "Hello".to_string(),
                voice: voice.clone(),
            })
            .await
            .unwrap();

        voice.stability = 0.9;
        let b = client
            .synthesize(SynthesisRequest {
                text: "Hello".to_string(),
                voice,
            })
            .await
            .unwrap();
        assert_ne!(a.audio, b.audio);
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid_input() {
        let client = FakeTtsClient::with_defaults();
        let result = client
            .synthesize(SynthesisRequest {
                text: "  ".to_string(),
                voice: VoiceConfig::default(),
            })
            .await;
        assert!(matches!(result, Err(TtsError::InvalidInput(_))));
    }
}
