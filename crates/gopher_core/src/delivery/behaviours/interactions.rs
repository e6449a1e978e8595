//! Button condition leaves.

use tokio::sync::broadcast;

use crate::delivery::{
    behaviours::{Behaviour, Status},
    core::interaction::{Button, Interactions},
};

/// Latched check of a hardware button.
///
/// Succeeds once the button has been pressed at any point since
/// construction. The latch survives composite restarts, so a stop press
/// during any tick of the delivery run keeps the cancellation branch armed.
pub struct CheckButtonPressed {
    name: String,
    feed: broadcast::Receiver<Button>,
    pressed: bool,
    status: Status,
}

impl CheckButtonPressed {
    pub fn new(name: &str, interactions: &Interactions, button: Button) -> Self {
        Self {
            name: name.to_string(),
            feed: interactions.subscribe(button),
            pressed: false,
            status: Status::Invalid,
        }
    }
}

impl Behaviour for CheckButtonPressed {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) -> Status {
        loop {
            match self.feed.try_recv() {
                Ok(_) => self.pressed = true,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        self.status = if self.pressed { Status::Success } else { Status::Failure };
        self.status
    }

    fn status(&self) -> Status {
        self.status
    }

    fn reset(&mut self) {
        // The press latch deliberately survives resets.
        self.status = Status::Invalid;
    }
}
