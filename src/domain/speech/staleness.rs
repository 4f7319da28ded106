//! Staleness Policy - 缓存新鲜度判定
//!
//! 只比较指纹，不看年龄：按龄淘汰是存储管理问题（CacheMaintenance），
//! 与正确性意义上的失效无关，两者不能混为一谈。

use super::{fingerprint, Fingerprint, VoiceConfig};

/// 判定当前缓存条目是否已失效
///
/// 规则（按顺序）:
/// 1. 槽位没有条目 → 失效（按缓存未命中处理，不是错误）
/// 2. 指纹与期望的 (文本, 音色配置) 不一致 → 失效
/// 3. 否则新鲜
pub fn is_stale(
    current_key: Option<&Fingerprint>,
    desired_text: &str,
    desired_voice: &VoiceConfig,
) -> bool {
    match current_key {
        None => true,
        Some(key) => fingerprint(desired_text, desired_voice) != *key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_stale() {
        assert!(is_stale(None, "Hello", &VoiceConfig::default()));
    }

    #[test]
    fn test_matching_fingerprint_is_fresh() {
        let voice = VoiceConfig::default();
        let key = fingerprint("Hello", &voice);
        assert!(!is_stale(Some(&key), "Hello", &voice));
    }

    #[test]
    fn test_changed_text_is_stale() {
        let voice = VoiceConfig::default();
        let key = fingerprint("Hello", &voice);
        assert!(is_stale(Some(&key), "Goodbye", &voice));
    }

    #[test]
    fn test_changed_voice_parameter_is_stale() {
        let voice = VoiceConfig::default();
        let key = fingerprint("Hello", &voice);

        let mut changed = voice.clone();
        changed.stability = 0.7;
        assert!(is_stale(Some(&key), "Hello", &changed));
    }
}
