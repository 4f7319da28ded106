//! Message Directory Port - 消息语料目录
//!
//! 批量再生成的语料来源：owner 列表，以及每条消息当前的文本与音色配置

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::speech::{OwnerId, VoiceConfig};

/// Message Directory 错误
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 一条可朗读消息的当前定义
#[derive(Debug, Clone)]
pub struct SpokenMessage {
    pub owner_id: OwnerId,
    pub text: String,
    pub voice: VoiceConfig,
    pub updated_at: DateTime<Utc>,
}

impl SpokenMessage {
    pub fn new(owner_id: OwnerId, text: impl Into<String>, voice: VoiceConfig) -> Self {
        Self {
            owner_id,
            text: text.into(),
            voice,
            updated_at: Utc::now(),
        }
    }
}

/// Message Directory Port
///
/// 再生成引擎只读；upsert/delete 供管理接口使用
#[async_trait]
pub trait MessageDirectoryPort: Send + Sync {
    /// 列出全部 owner
    async fn list_owner_ids(&self) -> Result<Vec<OwnerId>, DirectoryError>;

    /// 取某条消息的当前定义
    async fn find(&self, owner: &OwnerId) -> Result<Option<SpokenMessage>, DirectoryError>;

    /// 写入或更新消息定义
    async fn upsert(&self, message: SpokenMessage) -> Result<(), DirectoryError>;

    /// 删除消息定义，返回是否确实存在
    async fn delete(&self, owner: &OwnerId) -> Result<bool, DirectoryError>;
}
