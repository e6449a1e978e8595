//! Shared delivery state read and written by behaviours and the coordinator.

use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct BlackboardState {
    traversed_locations: Vec<String>,
    remaining_locations: Vec<String>,
    is_waiting: bool,
}

/// Cheaply clonable shared store; all clones see the same state.
///
/// Behaviours only mutate it through [`Blackboard::record_arrival`] and
/// [`Blackboard::set_waiting`], so the traversed and remaining lists cannot
/// disagree on the current leg.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    state: Arc<Mutex<BlackboardState>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traversed_locations(&self) -> Vec<String> {
        self.state.lock().map(|state| state.traversed_locations.clone()).unwrap_or_default()
    }

    pub fn remaining_locations(&self) -> Vec<String> {
        self.state.lock().map(|state| state.remaining_locations.clone()).unwrap_or_default()
    }

    pub fn is_waiting(&self) -> bool {
        self.state.lock().map(|state| state.is_waiting).unwrap_or(false)
    }

    pub fn set_waiting(&self, waiting: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.is_waiting = waiting;
        }
    }

    /// Seed the lists for a new delivery run.
    ///
    /// The traversed list is kept when pre-empting a live run, so feedback
    /// still reports where the robot has already been.
    pub fn start_run(&self, remaining: Vec<String>, keep_traversed: bool) {
        if let Ok(mut state) = self.state.lock() {
            if !keep_traversed {
                state.traversed_locations.clear();
            }
            state.remaining_locations = remaining;
            state.is_waiting = false;
        }
    }

    /// Record an arrival: append to traversed, drop the head of remaining.
    pub fn record_arrival(&self, unique_name: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.traversed_locations.push(unique_name.to_string());
            if state.remaining_locations.first().map(String::as_str) == Some(unique_name) {
                state.remaining_locations.remove(0);
            }
        }
    }

    /// Last confirmed arrival, if any.
    pub fn last_traversed(&self) -> Option<String> {
        self.state.lock().ok().and_then(|state| state.traversed_locations.last().cloned())
    }
}
