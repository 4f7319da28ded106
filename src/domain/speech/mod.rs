//! Speech Context - 语音内容上下文
//!
//! 纯领域逻辑，不做任何 I/O：
//! - 值对象：OwnerId（消息槽位标识）、VoiceConfig（音色配置）
//! - 指纹：由 (文本, 音色配置) 派生缓存 key
//! - 新鲜度：判定现有缓存条目是否需要再生成

mod fingerprint;
mod staleness;
mod value_objects;

pub use fingerprint::{fingerprint, text_digest, Fingerprint};
pub use staleness::is_stale;
pub use value_objects::{OwnerId, VoiceConfig};
