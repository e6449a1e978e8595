//! Recovery back to the homebase dock.

use tower::Service;

use crate::delivery::{
    api::types::{NavRequest, NavResponse},
    behaviours::{Activity, Behaviour, Status, motion::NavTask},
    core::{
        interaction::{Interactions, LedPattern, Notification},
        semantics::Location,
    },
    error::DeliveryError,
};

/// Drives the robot back to homebase after a cancelled or failed delivery.
///
/// Announces the recovery on the interaction hardware with the error LED
/// pattern so bystanders know the run is over.
pub struct HomebaseRecovery<N> {
    name: String,
    homebase: Location,
    task: NavTask<N>,
    interactions: Interactions,
    status: Status,
}

impl<N> HomebaseRecovery<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(name: &str, homebase: Location, nav: N, interactions: Interactions) -> Self {
        Self {
            name: name.to_string(),
            homebase,
            task: NavTask::new(nav),
            interactions,
            status: Status::Invalid,
        }
    }
}

impl<N> Behaviour for HomebaseRecovery<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) -> Status {
        if self.status != Status::Running {
            self.interactions.notify(Notification {
                led_pattern: LedPattern::Error,
                message: format!("{}, returning to homebase", self.name),
                ..Default::default()
            });
            self.task.dispatch(NavRequest::MoveTo(self.homebase.clone()));
        }
        self.status = match self.task.poll_outcome() {
            Some(Ok(_)) => Status::Success,
            Some(Err(_e)) => {
                #[cfg(feature = "gopher_tracing")]
                tracing::warn!("[recovery] homebase recovery failed: {}", _e);
                Status::Failure
            }
            None => Status::Running,
        };
        self.status
    }

    fn status(&self) -> Status {
        self.status
    }

    fn reset(&mut self) {
        self.status = Status::Invalid;
    }

    fn feedback_message(&self) -> String {
        format!("{}, returning to homebase", self.name)
    }

    fn activity(&self) -> Option<Activity> {
        (self.status == Status::Running).then_some(Activity::Recovering)
    }
}
