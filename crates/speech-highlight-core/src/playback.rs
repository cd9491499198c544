//! Playback state and the transitions that move it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Snapshot the UI highlights from. `None` indices mean nothing is spoken yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_word_index: Option<usize>,
    pub current_paragraph_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackLifecycle {
    Idle,
    Playing,
}

impl PlaybackState {
    pub const IDLE: PlaybackState = PlaybackState {
        is_playing: false,
        current_word_index: None,
        current_paragraph_index: None,
    };

    pub fn lifecycle(&self) -> PlaybackLifecycle {
        if self.is_playing {
            PlaybackLifecycle::Playing
        } else {
            PlaybackLifecycle::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.lifecycle(), PlaybackLifecycle::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The engine started producing audio.
    Started,
    /// A word boundary was resolved to these indices.
    Boundary {
        word: usize,
        paragraph: Option<usize>,
    },
    /// Stop, natural end, or engine fault.
    Reset,
}

/// Apply `event` to `state`; returns whether anything changed.
pub fn transition(state: &mut PlaybackState, event: PlaybackEvent) -> bool {
    let next = match (state.lifecycle(), event) {
        (_, PlaybackEvent::Started) => PlaybackState {
            is_playing: true,
            current_word_index: None,
            current_paragraph_index: None,
        },
        // Boundaries for a cancelled utterance must not resurrect indices.
        (PlaybackLifecycle::Idle, PlaybackEvent::Boundary { .. }) => *state,
        (PlaybackLifecycle::Playing, PlaybackEvent::Boundary { word, paragraph }) => {
            PlaybackState {
                is_playing: true,
                current_word_index: Some(word),
                current_paragraph_index: paragraph,
            }
        }
        (_, PlaybackEvent::Reset) => PlaybackState::IDLE,
    };

    if next == *state {
        return false;
    }
    *state = next;
    true
}
