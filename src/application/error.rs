//! 应用层错误定义
//!
//! 统一的服务层错误类型

use thiserror::Error;

use crate::application::ports::{CacheError, DirectoryError, TtsError};

/// 应用层错误
///
/// Clone 是有意的：同一在途合成的结果要分发给所有等待方
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误（空文本、参数越界等）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 合成失败（TTS 后端错误 / 超时 / 无效输入）
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::GenerationFailed(err.to_string())
    }
}

impl From<DirectoryError> for ApplicationError {
    fn from(err: DirectoryError) -> Self {
        Self::StorageError(err.to_string())
    }
}
