//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod cache_store;
mod message_directory;
mod tts_client;

pub use cache_store::{CacheEntry, CacheEntryMeta, CacheError, CacheStorePort};
pub use message_directory::{DirectoryError, MessageDirectoryPort, SpokenMessage};
pub use tts_client::{SynthesisRequest, SynthesisResponse, TtsClientPort, TtsError};
