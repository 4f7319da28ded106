mod database;
mod message_directory;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use message_directory::SqliteMessageDirectory;
