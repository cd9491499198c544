use crate::offsets::OffsetUnit;

pub(crate) fn default_speech_rate() -> f32 {
    1.0
}

pub(crate) fn default_speech_pitch() -> f32 {
    1.0
}

pub(crate) fn default_speech_lang() -> String {
    "en-US".to_string()
}

pub(crate) fn default_offset_unit() -> OffsetUnit {
    OffsetUnit::Char
}

pub(crate) fn default_words_per_minute() -> f32 {
    170.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
