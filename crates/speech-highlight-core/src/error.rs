use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech synthesis is not available in this environment")]
    CapabilityUnavailable,

    #[error("Narration engine error: {diagnostic}")]
    Engine { diagnostic: String },

    #[error("Boundary offset {offset} is outside text of length {len}")]
    IndexOutOfRange { offset: usize, len: usize },
}

impl SpeechError {
    pub fn engine(diagnostic: impl Into<String>) -> Self {
        SpeechError::Engine {
            diagnostic: diagnostic.into(),
        }
    }
}
