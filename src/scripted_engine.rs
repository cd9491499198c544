//! A stand-in narration engine that replays word boundaries on a timer.
//!
//! No audio is produced. Each utterance runs on its own thread, emitting
//! `Start`, one word boundary per word paced by words-per-minute and the
//! requested rate, then `End`. Events travel back to the owning loop over a
//! channel, tagged with the utterance generation.

use crate::cancellation::CancellationToken;
use speech_highlight_core::offsets::{OffsetUnit, build_word_offsets};
use speech_highlight_core::{
    BoundaryKind, EngineEvent, NarrationEngine, SpeechError, UtteranceEvent, UtteranceRequest,
};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Slowest pace the replay will settle for, however small the rate.
const MAX_WORD_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum DriverMessage {
    Engine(UtteranceEvent),
    Interrupt,
}

pub struct ScriptedEngine {
    events: Sender<DriverMessage>,
    words_per_minute: f32,
    unit: OffsetUnit,
    current: Option<CancellationToken>,
}

impl ScriptedEngine {
    pub fn new(events: Sender<DriverMessage>, words_per_minute: f32, unit: OffsetUnit) -> Self {
        Self {
            events,
            words_per_minute,
            unit,
            current: None,
        }
    }

    fn word_interval(&self, rate: f32) -> Duration {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let wpm = if self.words_per_minute.is_finite() && self.words_per_minute > 0.0 {
            self.words_per_minute
        } else {
            170.0
        };
        Duration::try_from_secs_f64(60.0 / f64::from(wpm * rate))
            .map_or(MAX_WORD_INTERVAL, |interval| interval.min(MAX_WORD_INTERVAL))
    }
}

impl NarrationEngine for ScriptedEngine {
    fn speak(&mut self, request: UtteranceRequest) -> Result<(), SpeechError> {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let interval = self.word_interval(request.rate);
        let offsets = build_word_offsets(&request.text, self.unit);
        let events = self.events.clone();
        let generation = request.generation;
        info!(
            generation,
            words = offsets.len(),
            interval_ms = interval.as_millis(),
            lang = %request.lang,
            "Scripted engine speaking"
        );

        thread::Builder::new()
            .name(format!("narration-{generation}"))
            .spawn(move || {
                let send = |event: EngineEvent| {
                    events
                        .send(DriverMessage::Engine(UtteranceEvent::new(generation, event)))
                        .is_ok()
                };
                if !send(EngineEvent::Start) {
                    return;
                }
                for &char_index in offsets.as_slice() {
                    let boundary = EngineEvent::Boundary {
                        kind: BoundaryKind::Word,
                        char_index,
                    };
                    if !send(boundary) || !token.sleep(interval) {
                        debug!(generation, "Scripted utterance interrupted");
                        return;
                    }
                }
                send(EngineEvent::End);
            })
            .map_err(|err| SpeechError::engine(format!("failed to spawn narration thread: {err}")))?;
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}
