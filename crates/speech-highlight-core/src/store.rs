//! Owned playback state plus the listeners that mirror it into a UI.

use crate::playback::{PlaybackEvent, PlaybackState, transition};
use tracing::trace;

type Listener = Box<dyn FnMut(&PlaybackState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct PlaybackStore {
    state: PlaybackState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PlaybackStore {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::IDLE,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Register `listener`; it is called right away with the current state.
    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        listener(&self.state);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Apply one transition and notify listeners if the state moved.
    pub fn dispatch(&mut self, event: PlaybackEvent) -> bool {
        if !transition(&mut self.state, event) {
            return false;
        }
        trace!(
            ?event,
            listeners = self.listeners.len(),
            "Playback state changed"
        );
        let state = self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&state);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<PlaybackState>>>, impl FnMut(&PlaybackState) + Send) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |state: &PlaybackState| {
            sink.lock().unwrap().push(*state);
        })
    }

    #[test]
    fn subscribe_emits_current_state_immediately() {
        let mut store = PlaybackStore::new();
        let (seen, listener) = recorder();
        store.subscribe(listener);
        assert_eq!(*seen.lock().unwrap(), vec![PlaybackState::IDLE]);
    }

    #[test]
    fn listeners_only_hear_real_changes() {
        let mut store = PlaybackStore::new();
        let (seen, listener) = recorder();
        store.subscribe(listener);

        assert!(!store.dispatch(PlaybackEvent::Reset));
        assert!(store.dispatch(PlaybackEvent::Started));
        assert!(store.dispatch(PlaybackEvent::Boundary {
            word: 0,
            paragraph: Some(0),
        }));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].current_word_index, Some(0));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = PlaybackStore::new();
        let (seen, listener) = recorder();
        let id = store.subscribe(listener);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(PlaybackEvent::Started);

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(store.listener_count(), 0);
    }
}
