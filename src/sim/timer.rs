//! Race countdown and end-of-race classification
//!
//! The countdown runs off its own one-second clock, separate from the frame tick.

use serde::{Deserialize, Serialize};

use super::state::{RaceEnd, RaceEvent, RaceState};

/// Final outcome reported to the screen layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub score: u64,
    /// True when the clock ran out with lives left
    pub completed: bool,
    pub level: u32,
}

/// Pure form: apply one elapsed second to a copy of the state
pub fn countdown(state: &RaceState) -> (RaceState, Vec<RaceEvent>) {
    let mut next = state.clone();
    let events = countdown_second(&mut next);
    (next, events)
}

/// Decrement the remaining time by one second, ending the race at zero.
///
/// No-op once the race has stopped, so a late timer firing after a fatal
/// collision cannot produce a second ending.
pub fn countdown_second(state: &mut RaceState) -> Vec<RaceEvent> {
    if !state.running {
        return Vec::new();
    }

    state.time_remaining = state.time_remaining.saturating_sub(1);
    if state.time_remaining == 0 && state.finish(RaceEnd::TimeExpired) {
        log::info!("Time up on level {} with score {}", state.level, state.score);
        return vec![RaceEvent::TimeExpired];
    }
    Vec::new()
}

impl RaceState {
    /// Outcome of a finished race, or None while it is still running
    pub fn result(&self) -> Option<RaceResult> {
        let end = self.end?;
        Some(RaceResult {
            score: self.score,
            completed: end == RaceEnd::TimeExpired,
            level: self.level,
        })
    }
}
