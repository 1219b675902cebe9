use std::collections::HashMap;
use std::time::Instant;

/// Outcome of feeding one classification into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// First observation of this pane; nothing to compare against
    Initialized,
    /// Idle -> active
    BecameActive,
    /// Active -> idle, the only edge that notifies
    BecameIdle,
    /// Same classification as last time
    NoChange,
}

/// Last known activity of one pane
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneState {
    pub last_seen_active: Option<bool>,
    pub last_transition: Option<Instant>,
}

/// Per-pane memory of the last classification, keyed by pane ID.
///
/// Entries are created on first observation and never evicted.
#[derive(Debug, Default)]
pub struct TransitionTracker {
    states: HashMap<String, PaneState>,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification for `pane_id` and report the transition
    pub fn observe(&mut self, pane_id: &str, looks_active: bool) -> TransitionEvent {
        self.observe_at(pane_id, looks_active, Instant::now())
    }

    pub fn observe_at(&mut self, pane_id: &str, looks_active: bool, now: Instant) -> TransitionEvent {
        let state = self.states.entry(pane_id.to_string()).or_default();

        let event = match state.last_seen_active {
            None => TransitionEvent::Initialized,
            Some(true) if !looks_active => TransitionEvent::BecameIdle,
            Some(false) if looks_active => TransitionEvent::BecameActive,
            Some(_) => return TransitionEvent::NoChange,
        };

        state.last_seen_active = Some(looks_active);
        state.last_transition = Some(now);
        event
    }

    #[cfg(test)]
    pub fn state(&self, pane_id: &str) -> Option<&PaneState> {
        self.states.get(pane_id)
    }

    /// Number of panes ever observed
    pub fn len(&self) -> usize {
        self.states.len()
    }
}
