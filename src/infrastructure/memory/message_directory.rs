//! In-Memory Message Directory Implementation
//!
//! 测试与演示用；语料不落盘

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{DirectoryError, MessageDirectoryPort, SpokenMessage};
use crate::domain::speech::OwnerId;

/// 内存消息目录
#[derive(Default)]
pub struct InMemoryMessageDirectory {
    messages: DashMap<String, SpokenMessage>,
}

impl InMemoryMessageDirectory {
    pub fn new() -> Self {
        Self {
            messages: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl MessageDirectoryPort for InMemoryMessageDirectory {
    async fn list_owner_ids(&self) -> Result<Vec<OwnerId>, DirectoryError> {
        let mut ids: Vec<String> = self.messages.iter().map(|e| e.key().clone()).collect();
        // 排序保证遍历结果可复现
        ids.sort_unstable();
        Ok(ids.into_iter().map(OwnerId::new).collect())
    }

    async fn find(&self, owner: &OwnerId) -> Result<Option<SpokenMessage>, DirectoryError> {
        Ok(self.messages.get(owner.as_str()).map(|m| m.clone()))
    }

    async fn upsert(&self, message: SpokenMessage) -> Result<(), DirectoryError> {
        self.messages
            .insert(message.owner_id.as_str().to_string(), message);
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId) -> Result<bool, DirectoryError> {
        Ok(self.messages.remove(owner.as_str()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::VoiceConfig;

    #[tokio::test]
    async fn test_directory_lifecycle() {
        let directory = InMemoryMessageDirectory::new();
        let owner = OwnerId::new("msg_1");

        directory
            .upsert(SpokenMessage::new(
                owner.clone(),
                "Hello",
                VoiceConfig::default(),
            ))
            .await
            .unwrap();

        let found = directory.find(&owner).await.unwrap().unwrap();
        assert_eq!(found.text, "Hello");

        assert!(directory.delete(&owner).await.unwrap());
        assert!(directory.find(&owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_deterministic() {
        let directory = InMemoryMessageDirectory::new();
        for owner in ["zulu", "alpha", "mike"] {
            directory
                .upsert(SpokenMessage::new(
                    OwnerId::new(owner),
                    "text",
                    VoiceConfig::default(),
                ))
                .await
                .unwrap();
        }

        let ids: Vec<String> = directory
            .list_owner_ids()
            .await
            .unwrap()
            .into_iter()
            .map(OwnerId::into_string)
            .collect();
        assert_eq!(ids, vec!["alpha", "mike", "zulu"]);
    }
}
