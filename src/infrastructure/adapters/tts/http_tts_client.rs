//! HTTP TTS Client - 调用外部合成服务
//!
//! 实现 TtsClientPort trait，通过 HTTP 调用外部 TTS 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"text": "...", "voice_id": "...", "stability": 0.5, ...} (JSON)
//! Response: 音频二进制，Content-Type 标明格式

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::{SynthesisRequest, SynthesisResponse, TtsClientPort, TtsError};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesizeHttpRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    stability: f32,
    similarity: f32,
    style: f32,
    speed: f32,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），超时产生 TtsError::Timeout
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 不在内部重试；等待上限由配置给定
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::Provider(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> Result<Self, TtsError> {
        Self::new(HttpTtsClientConfig::default())
    }

    /// 获取合成 URL
    fn synthesize_url(&self) -> String {
        format!("{}/api/tts/synthesize", self.config.base_url)
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url)
    }
}

#[async_trait]
impl TtsClientPort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError> {
        let request_id = Uuid::new_v4();
        let http_request = SynthesizeHttpRequest {
            text: &request.text,
            voice_id: &request.voice.voice_id,
            stability: request.voice.stability,
            similarity: request.voice.similarity,
            style: request.voice.style,
            speed: request.voice.speed,
        };

        tracing::debug!(
            request_id = %request_id,
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            voice_id = %request.voice.voice_id,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::Provider(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::InvalidInput(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::Provider(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let mime_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::Provider(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio.is_empty() {
            return Err(TtsError::Provider("Empty audio payload".to_string()));
        }

        tracing::info!(
            request_id = %request_id,
            audio_size = audio.len(),
            mime_type = %mime_type,
            "Synthesis completed"
        );

        Ok(SynthesisResponse { audio, mime_type })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::new("http://tts.internal:9000").with_timeout(30);
        assert_eq!(config.base_url, "http://tts.internal:9000");
        assert_eq!(config.timeout_secs, 30);
    }
}
