use crate::config::SpeechConfig;
use crate::engine::{BoundaryKind, EngineEvent, NarrationEngine, UtteranceEvent, UtteranceRequest};
use crate::error::SpeechError;
use crate::offsets::{ParagraphDescriptor, TextIndex, WordOffsetTable};
use crate::playback::{PlaybackEvent, PlaybackState};
use crate::store::{PlaybackStore, SubscriptionId};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One text prepared for narration. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SpeechSession {
    text: Arc<str>,
    index: Arc<TextIndex>,
}

impl SpeechSession {
    pub fn new(text: impl Into<Arc<str>>, config: &SpeechConfig) -> Self {
        let text: Arc<str> = text.into();
        let index = Arc::new(TextIndex::build(&text, config.offset_unit));
        Self { text, index }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn paragraphs(&self) -> &[ParagraphDescriptor] {
        self.index.paragraphs()
    }

    pub fn word_offsets(&self) -> &WordOffsetTable {
        self.index.word_offsets()
    }

    pub fn word_count(&self) -> usize {
        self.index.word_count()
    }

    pub fn word_at(&self, word_idx: usize) -> Option<&str> {
        self.index.word_at(word_idx)
    }

    pub fn paragraph_word_range(&self, paragraph_idx: usize) -> Option<Range<usize>> {
        self.index
            .paragraphs()
            .get(paragraph_idx)
            .map(ParagraphDescriptor::word_range)
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started { generation: u64 },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    StaleGeneration,
    NotPlaying,
    NonWordBoundary,
    NoWords,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    Ignored(IgnoreReason),
    Reset,
}

#[derive(Debug)]
struct ActiveUtterance {
    generation: u64,
    index: Arc<TextIndex>,
}

/// Drives playback state from a narration engine's event stream.
///
/// The highlighter is the single owner of [`PlaybackState`]. Hosts that
/// receive engine callbacks on other threads should forward them to the
/// owning task rather than share the highlighter.
pub struct SpeechHighlighter<E> {
    config: SpeechConfig,
    engine: Option<E>,
    store: PlaybackStore,
    generation: u64,
    active: Option<ActiveUtterance>,
}

impl<E> std::fmt::Debug for SpeechHighlighter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechHighlighter")
            .field("config", &self.config)
            .field("engine_attached", &self.engine.is_some())
            .field("store", &self.store)
            .field("generation", &self.generation)
            .field("active", &self.active.as_ref().map(|active| active.generation))
            .finish()
    }
}

impl<E: NarrationEngine> SpeechHighlighter<E> {
    pub fn new(config: SpeechConfig, engine: Option<E>) -> Self {
        if engine.is_none() {
            warn!("No narration engine attached; playback requests will fail");
        }
        Self {
            config,
            engine,
            store: PlaybackStore::new(),
            generation: 0,
            active: None,
        }
    }

    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.store.state()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Generation of the utterance whose events are currently accepted.
    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.generation)
    }

    pub fn build_session(&self, text: impl Into<Arc<str>>) -> SpeechSession {
        let session = SpeechSession::new(text, &self.config);
        info!(
            words = session.word_count(),
            paragraphs = session.paragraphs().len(),
            unit = %self.config.offset_unit,
            "Built narration offset tables"
        );
        session
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackState) + Send + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn toggle(&mut self, session: &SpeechSession) -> Result<ToggleOutcome, SpeechError> {
        if self.engine.is_none() {
            return Err(SpeechError::CapabilityUnavailable);
        }
        if self.store.state().is_playing {
            self.stop();
            return Ok(ToggleOutcome::Stopped);
        }
        self.start(session)
            .map(|generation| ToggleOutcome::Started { generation })
    }

    /// Ask the engine to narrate `session`, superseding any utterance in
    /// flight. State stays idle until the engine reports that audio started.
    pub fn start(&mut self, session: &SpeechSession) -> Result<u64, SpeechError> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(SpeechError::CapabilityUnavailable);
        };

        if let Some(previous) = self.active.take() {
            debug!(
                generation = previous.generation,
                "Cancelling superseded utterance"
            );
            engine.cancel();
            self.store.dispatch(PlaybackEvent::Reset);
        }

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let request = UtteranceRequest {
            generation,
            text: Arc::clone(&session.text),
            rate: self.config.speech_rate,
            pitch: self.config.speech_pitch,
            lang: self.config.speech_lang.clone(),
        };
        engine.speak(request)?;

        self.active = Some(ActiveUtterance {
            generation,
            index: Arc::clone(&session.index),
        });
        info!(
            generation,
            words = session.word_count(),
            rate = self.config.speech_rate,
            pitch = self.config.speech_pitch,
            lang = %self.config.speech_lang,
            "Requested narration"
        );
        Ok(generation)
    }

    /// Cancel the active utterance and return to idle. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Some(engine) = self.engine.as_mut() {
                engine.cancel();
            }
            info!(generation = active.generation, "Stopped narration");
        }
        self.store.dispatch(PlaybackEvent::Reset);
    }

    pub fn handle_event(&mut self, event: UtteranceEvent) -> EventOutcome {
        let UtteranceEvent { generation, event } = event;
        let Some(active) = self.active.as_ref() else {
            debug!(generation, ?event, "Ignoring engine event with no active utterance");
            return EventOutcome::Ignored(IgnoreReason::StaleGeneration);
        };
        if active.generation != generation {
            debug!(
                generation,
                current = active.generation,
                "Ignoring stale engine event"
            );
            return EventOutcome::Ignored(IgnoreReason::StaleGeneration);
        }

        match event {
            EngineEvent::Start => {
                debug!(generation, "Narration started");
                self.apply(PlaybackEvent::Started)
            }
            EngineEvent::Boundary { kind, char_index } => self.on_boundary(kind, char_index),
            EngineEvent::End => {
                debug!(generation, "Narration finished");
                self.finish()
            }
            EngineEvent::Error { diagnostic } => {
                let err = SpeechError::Engine { diagnostic };
                error!(generation, "{err}");
                self.finish()
            }
        }
    }

    /// Stop playback and hand the engine back, e.g. when the host unmounts.
    pub fn detach_engine(&mut self) -> Option<E> {
        self.stop();
        self.engine.take()
    }

    pub fn attach_engine(&mut self, engine: E) -> Option<E> {
        let previous = self.detach_engine();
        self.engine = Some(engine);
        previous
    }

    pub fn shutdown(&mut self) {
        if self.detach_engine().is_some() {
            info!("Narration engine released");
        }
    }

    fn on_boundary(&mut self, kind: BoundaryKind, char_index: usize) -> EventOutcome {
        if kind != BoundaryKind::Word {
            return EventOutcome::Ignored(IgnoreReason::NonWordBoundary);
        }
        if !self.store.state().is_playing {
            return EventOutcome::Ignored(IgnoreReason::NotPlaying);
        }
        let Some(active) = self.active.as_ref() else {
            return EventOutcome::Ignored(IgnoreReason::StaleGeneration);
        };

        let offset = match active.index.checked_offset(char_index) {
            Ok(offset) => offset,
            Err(err) => {
                warn!(generation = active.generation, "{err}; clamping to last word");
                active.index.text_len()
            }
        };
        let resolved = active.index.resolve(offset);
        let Some(word) = resolved.word else {
            return EventOutcome::Ignored(IgnoreReason::NoWords);
        };
        if resolved.paragraph.is_none() {
            warn!(
                generation = active.generation,
                word, "Resolved word falls outside every paragraph"
            );
        }

        self.apply(PlaybackEvent::Boundary {
            word,
            paragraph: resolved.paragraph,
        })
    }

    fn finish(&mut self) -> EventOutcome {
        self.active = None;
        self.store.dispatch(PlaybackEvent::Reset);
        EventOutcome::Reset
    }

    fn apply(&mut self, event: PlaybackEvent) -> EventOutcome {
        if self.store.dispatch(event) {
            EventOutcome::Applied
        } else {
            EventOutcome::Ignored(IgnoreReason::Unchanged)
        }
    }
}
