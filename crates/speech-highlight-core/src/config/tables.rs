use super::defaults;
use super::models::{AppConfig, LogLevel, SpeechConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    speech: SpeechConfig,
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            speech: tables.speech,
            words_per_minute: tables.engine.words_per_minute,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            speech: config.speech.clone(),
            engine: EngineConfig {
                words_per_minute: config.words_per_minute,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct EngineConfig {
    #[serde(default = "defaults::default_words_per_minute")]
    words_per_minute: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            words_per_minute: defaults::default_words_per_minute(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
