//! Holding at a stop until a human sends the robot onward.

use tokio::sync::broadcast;

use crate::delivery::{
    behaviours::{Activity, Behaviour, Status},
    core::{
        blackboard::Blackboard,
        interaction::{Button, ButtonState, Interactions, Notification},
    },
};

/// Holds at a stop until the go button is pressed.
///
/// In express mode ("don't wait for humans") the behaviour succeeds
/// immediately without prompting.
pub struct Waiting {
    name: String,
    interactions: Interactions,
    blackboard: Blackboard,
    express: bool,
    go_feed: Option<broadcast::Receiver<Button>>,
    status: Status,
}

impl Waiting {
    pub fn new(
        location: &str,
        interactions: Interactions,
        blackboard: Blackboard,
        express: bool,
    ) -> Self {
        Self {
            name: format!("waiting at '{location}'"),
            interactions,
            blackboard,
            express,
            go_feed: None,
            status: Status::Invalid,
        }
    }

    fn go_pressed(&mut self) -> bool {
        let Some(feed) = self.go_feed.as_mut() else {
            return false;
        };
        loop {
            match feed.try_recv() {
                Ok(_) => return true,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return false,
            }
        }
    }
}

impl Behaviour for Waiting {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) -> Status {
        if self.express {
            self.status = Status::Success;
            return self.status;
        }
        if self.status != Status::Running {
            // Subscribe before prompting so a press cannot slip past.
            self.go_feed = Some(self.interactions.subscribe(Button::Go));
            self.interactions.notify(Notification {
                button_confirm: ButtonState::On,
                message: "at location, waiting for button press".to_string(),
                ..Default::default()
            });
            self.blackboard.set_waiting(true);
        }
        self.status = if self.go_pressed() {
            self.blackboard.set_waiting(false);
            self.interactions.notify(Notification {
                button_confirm: ButtonState::Off,
                message: "go button pressed".to_string(),
                ..Default::default()
            });
            Status::Success
        } else {
            Status::Running
        };
        self.status
    }

    fn status(&self) -> Status {
        self.status
    }

    fn reset(&mut self) {
        self.go_feed = None;
        self.blackboard.set_waiting(false);
        self.status = Status::Invalid;
    }

    fn feedback_message(&self) -> String {
        format!("remaining: {:?}", self.blackboard.remaining_locations())
    }

    fn activity(&self) -> Option<Activity> {
        (self.status == Status::Running).then_some(Activity::Waiting)
    }
}
