//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::speech::VoiceConfig;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Audio DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetAudioRequest {
    pub owner_id: String,
    pub text: String,
    #[serde(default)]
    pub voice: VoiceConfig,
}

// ============================================================================
// Regeneration DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegenerateOneRequest {
    pub owner_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateAllRequest {
    /// 不给时对目录全量再生成
    #[serde(default)]
    pub owner_ids: Option<Vec<String>>,
}

// ============================================================================
// Maintenance DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClearCacheRequest {
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub removed: u64,
}

// ============================================================================
// Message DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpsertMessageRequest {
    pub owner_id: String,
    pub text: String,
    #[serde(default)]
    pub voice: VoiceConfig,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMessageRequest {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessageResponse {
    pub deleted: bool,
}
