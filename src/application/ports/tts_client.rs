//! TTS Client Port - 外部语音合成服务抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::speech::VoiceConfig;

/// TTS 错误
///
/// 单条操作原样上抛；批量操作按条捕获，绝不中断整批
#[derive(Debug, Error)]
pub enum TtsError {
    /// TTS 后端拒绝或出错（含网络故障）
    #[error("Provider error: {0}")]
    Provider(String),

    /// 文本为空或格式非法
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 超过配置的等待上限
    #[error("Request timeout")]
    Timeout,
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 音色配置
    pub voice: VoiceConfig,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// 原始音频字节
    pub audio: Vec<u8>,
    /// MIME 类型
    pub mime_type: String,
}

/// TTS Client Port
///
/// 对外部合成服务的抽象：可能很慢、可能失败。不在内部重试，
/// 重试策略（若有）属于调用 RegenerationEngine 的那一层
#[async_trait]
pub trait TtsClientPort: Send + Sync {
    /// 执行语音合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, TtsError>;

    /// 检查合成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
