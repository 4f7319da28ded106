//! Cache Fingerprint - 缓存指纹
//!
//! 由 (文本, 音色配置) 派生缓存 key 的纯函数。
//! 同样的输入必然得到同一个 key；文本或任一数值参数变化必然得到新 key，
//! 因此相同内容的重复合成是缓存命中，而配置变更绝不会错误命中旧音频。

use serde::{Deserialize, Serialize};

use super::VoiceConfig;

/// 字段分隔符，避免字段拼接产生歧义
const SEP: u8 = 0x1f;

/// 缓存指纹
///
/// md5 摘要的十六进制表示，可直接用作存储 key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// 从已有的十六进制摘要还原（存储层反序列化用）
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 计算 (文本, 音色配置) 的缓存指纹
///
/// 浮点参数按 IEEE-754 位模式（小端字节序）参与哈希，跨平台稳定
pub fn fingerprint(text: &str, voice: &VoiceConfig) -> Fingerprint {
    let mut buf = Vec::with_capacity(text.len() + voice.voice_id.len() + 24);
    buf.extend_from_slice(text.as_bytes());
    buf.push(SEP);
    buf.extend_from_slice(voice.voice_id.as_bytes());
    for bits in [
        voice.stability.to_bits(),
        voice.similarity.to_bits(),
        voice.style.to_bits(),
        voice.speed.to_bits(),
    ] {
        buf.push(SEP);
        buf.extend_from_slice(&bits.to_le_bytes());
    }
    Fingerprint(format!("{:x}", md5::compute(&buf)))
}

/// 文本摘要
///
/// 记录在缓存条目上，标识这条音频当初由哪段文本合成
pub fn text_digest(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let voice = VoiceConfig::default();
        let a = fingerprint("Welcome back", &voice);
        let b = fingerprint("Welcome back", &voice);
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_change_produces_new_key() {
        let voice = VoiceConfig::default();
        let a = fingerprint("Welcome back", &voice);
        let b = fingerprint("Welcome back!", &voice);
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_voice_field_affects_key() {
        let base = VoiceConfig::default();
        let key = fingerprint("Hello", &base);

        let mut changed = base.clone();
        changed.voice_id = "v2".to_string();
        assert_ne!(key, fingerprint("Hello", &changed));

        let mut changed = base.clone();
        changed.stability = 0.6;
        assert_ne!(key, fingerprint("Hello", &changed));

        let mut changed = base.clone();
        changed.similarity = 0.9;
        assert_ne!(key, fingerprint("Hello", &changed));

        let mut changed = base.clone();
        changed.style = 0.3;
        assert_ne!(key, fingerprint("Hello", &changed));

        let mut changed = base.clone();
        changed.speed = 1.25;
        assert_ne!(key, fingerprint("Hello", &changed));
    }

    #[test]
    fn test_text_digest_matches_exact_text_only() {
        assert_eq!(text_digest("Hello"), text_digest("Hello"));
        assert_ne!(text_digest("Hello"), text_digest("hello"));
    }
}
