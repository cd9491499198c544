//! The narration engine seam: what we ask of it and what it tells us back.

use crate::error::SpeechError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Start,
    Boundary { kind: BoundaryKind, char_index: usize },
    End,
    Error { diagnostic: String },
}

/// An engine event tagged with the utterance that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub generation: u64,
    pub event: EngineEvent,
}

impl UtteranceEvent {
    pub fn new(generation: u64, event: EngineEvent) -> Self {
        Self { generation, event }
    }
}

/// Everything an engine needs to speak one utterance.
///
/// Rate, pitch and language are passed through untouched. Engines must tag
/// every event for this utterance with `generation`.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub generation: u64,
    pub text: Arc<str>,
    pub rate: f32,
    pub pitch: f32,
    pub lang: String,
}

pub trait NarrationEngine {
    /// Queue `request` for playback. Events arrive later, out of band.
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), SpeechError>;

    /// Drop whatever utterance is in flight.
    fn cancel(&mut self);
}

impl<E: NarrationEngine + ?Sized> NarrationEngine for Box<E> {
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), SpeechError> {
        (**self).speak(request)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}
