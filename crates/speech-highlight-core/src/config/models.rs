use crate::offsets::OffsetUnit;
use serde::Deserialize;

/// Options handed to the narration engine with every utterance.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct SpeechConfig {
    #[serde(default = "crate::config::defaults::default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "crate::config::defaults::default_speech_pitch")]
    pub speech_pitch: f32,
    #[serde(default = "crate::config::defaults::default_speech_lang")]
    pub speech_lang: String,
    #[serde(default = "crate::config::defaults::default_offset_unit")]
    pub offset_unit: OffsetUnit,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            speech_rate: crate::config::defaults::default_speech_rate(),
            speech_pitch: crate::config::defaults::default_speech_pitch(),
            speech_lang: crate::config::defaults::default_speech_lang(),
            offset_unit: crate::config::defaults::default_offset_unit(),
        }
    }
}

/// Full application configuration, flattened from the TOML tables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub speech: SpeechConfig,
    pub words_per_minute: f32,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            speech: SpeechConfig::default(),
            words_per_minute: crate::config::defaults::default_words_per_minute(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Default, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
