//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};

/// 消息槽位标识
///
/// 调用方传入的不透明 ID。一个槽位任意时刻只有一条"当前"缓存音频；
/// 再生成会替换当前指针而不是追加
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色配置参数
///
/// 任一字段变化都会产生不同的缓存指纹，因此也会触发再合成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// 音色 ID
    pub voice_id: String,
    /// 稳定度 (0.0 - 1.0)
    pub stability: f32,
    /// 相似度 (0.0 - 1.0)
    pub similarity: f32,
    /// 风格强度 (0.0 - 1.0)
    pub style: f32,
    /// 语速 (0.5 - 2.0)
    pub speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_id: "default".to_string(),
            stability: 0.5,
            similarity: 0.75,
            style: 0.0,
            speed: 1.0,
        }
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.voice_id.is_empty() {
            return Err("音色 ID 不能为空");
        }
        for value in [self.stability, self.similarity, self.style, self.speed] {
            if !value.is_finite() {
                return Err("音色参数必须是有限数值");
            }
        }
        if !(0.0..=1.0).contains(&self.stability) {
            return Err("稳定度必须在 0.0 到 1.0 之间");
        }
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err("相似度必须在 0.0 到 1.0 之间");
        }
        if !(0.0..=1.0).contains(&self.style) {
            return Err("风格强度必须在 0.0 到 1.0 之间");
        }
        if !(0.5..=2.0).contains(&self.speed) {
            return Err("语速必须在 0.5 到 2.0 之间");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_voice_config_is_valid() {
        assert!(VoiceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_parameters_rejected() {
        let mut config = VoiceConfig::default();
        config.stability = 1.5;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.speed = 0.1;
        assert!(config.validate().is_err());

        let mut config = VoiceConfig::default();
        config.style = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_voice_id_rejected() {
        let mut config = VoiceConfig::default();
        config.voice_id = String::new();
        assert!(config.validate().is_err());
    }
}
