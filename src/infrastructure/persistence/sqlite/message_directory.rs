//! SQLite Message Directory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{DirectoryError, MessageDirectoryPort, SpokenMessage};
use crate::domain::speech::{OwnerId, VoiceConfig};

/// SQLite Message Directory
pub struct SqliteMessageDirectory {
    pool: DbPool,
}

impl SqliteMessageDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MessageRow {
    owner_id: String,
    text: String,
    voice_id: String,
    stability: f64,
    similarity: f64,
    style: f64,
    speed: f64,
    updated_at: String,
}

impl TryFrom<MessageRow> for SpokenMessage {
    type Error = DirectoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(SpokenMessage {
            owner_id: OwnerId::new(row.owner_id),
            text: row.text,
            voice: VoiceConfig {
                voice_id: row.voice_id,
                stability: row.stability as f32,
                similarity: row.similarity as f32,
                style: row.style as f32,
                speed: row.speed as f32,
            },
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| DirectoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl MessageDirectoryPort for SqliteMessageDirectory {
    async fn list_owner_ids(&self) -> Result<Vec<OwnerId>, DirectoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT owner_id FROM messages ORDER BY owner_id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| OwnerId::new(id)).collect())
    }

    async fn find(&self, owner: &OwnerId) -> Result<Option<SpokenMessage>, DirectoryError> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            SELECT owner_id, text, voice_id, stability, similarity, style, speed, updated_at
            FROM messages WHERE owner_id = ?
            "#,
        )
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        row.map(SpokenMessage::try_from).transpose()
    }

    async fn upsert(&self, message: SpokenMessage) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO messages (owner_id, text, voice_id, stability, similarity, style, speed, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(owner_id) DO UPDATE SET
                text = excluded.text,
                voice_id = excluded.voice_id,
                stability = excluded.stability,
                similarity = excluded.similarity,
                style = excluded.style,
                speed = excluded.speed,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(message.owner_id.as_str())
        .bind(&message.text)
        .bind(&message.voice.voice_id)
        .bind(message.voice.stability as f64)
        .bind(message.voice.similarity as f64)
        .bind(message.voice.style as f64)
        .bind(message.voice.speed as f64)
        .bind(message.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, owner: &OwnerId) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE owner_id = ?")
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DirectoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn test_directory() -> SqliteMessageDirectory {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMessageDirectory::new(pool)
    }

    #[tokio::test]
    async fn test_message_lifecycle() {
        let directory = test_directory().await;
        let owner = OwnerId::new("msg_42");

        // Upsert
        let mut voice = VoiceConfig::default();
        voice.stability = 0.6;
        directory
            .upsert(SpokenMessage::new(owner.clone(), "Welcome back", voice))
            .await
            .unwrap();

        // Find
        let message = directory.find(&owner).await.unwrap().unwrap();
        assert_eq!(message.text, "Welcome back");
        assert!((message.voice.stability - 0.6).abs() < 1e-6);

        // Update
        directory
            .upsert(SpokenMessage::new(
                owner.clone(),
                "Welcome back!",
                VoiceConfig::default(),
            ))
            .await
            .unwrap();
        let message = directory.find(&owner).await.unwrap().unwrap();
        assert_eq!(message.text, "Welcome back!");

        // Delete
        assert!(directory.delete(&owner).await.unwrap());
        assert!(directory.find(&owner).await.unwrap().is_none());
        assert!(!directory.delete(&owner).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_owner_ids_is_sorted() {
        let directory = test_directory().await;
        for owner in ["charlie", "alpha", "bravo"] {
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
        assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    }
}
