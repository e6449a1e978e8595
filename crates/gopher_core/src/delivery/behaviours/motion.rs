//! Navigation-driven leaves.
//!
//! Ticking must not block, so each leaf dispatches its navigation call onto
//! a tokio task and polls a shared outcome slot on subsequent ticks.

use std::sync::{Arc, Mutex};

use tower::{Service, ServiceExt};

use crate::delivery::{
    api::types::{NavRequest, NavResponse},
    behaviours::{Activity, Behaviour, Status},
    core::{blackboard::Blackboard, semantics::Location},
    error::DeliveryError,
};

/// One in-flight navigation call and its outcome slot.
pub(crate) struct NavTask<N> {
    nav: N,
    outcome: Arc<Mutex<Option<Result<NavResponse, DeliveryError>>>>,
}

impl<N> NavTask<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub(crate) fn new(nav: N) -> Self {
        Self { nav, outcome: Arc::new(Mutex::new(None)) }
    }

    /// Spawn the navigation call; any previous outcome is discarded.
    pub(crate) fn dispatch(&self, request: NavRequest) {
        if let Ok(mut slot) = self.outcome.lock() {
            *slot = None;
        }
        let mut nav = self.nav.clone();
        let outcome = self.outcome.clone();
        tokio::spawn(async move {
            let result = match nav.ready().await {
                Ok(service) => service.call(request).await,
                Err(e) => Err(e),
            };
            if let Ok(mut slot) = outcome.lock() {
                *slot = Some(result);
            }
        });
    }

    /// Take the outcome if the call has finished.
    pub(crate) fn poll_outcome(&self) -> Option<Result<NavResponse, DeliveryError>> {
        self.outcome.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Drives the robot to a semantic location.
///
/// On arrival the location is recorded on the blackboard, keeping the
/// traversed and remaining lists consistent with the robot's position.
pub struct MoveTo<N> {
    name: String,
    target: Location,
    task: NavTask<N>,
    blackboard: Blackboard,
    status: Status,
}

impl<N> MoveTo<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(target: Location, nav: N, blackboard: Blackboard) -> Self {
        Self {
            name: format!("move to '{}'", target.unique_name),
            target,
            task: NavTask::new(nav),
            blackboard,
            status: Status::Invalid,
        }
    }
}

impl<N> Behaviour for MoveTo<N>
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
            #[cfg(feature = "gopher_tracing")]
            tracing::info!("[motion] heading toward '{}'", self.target.unique_name);
            self.task.dispatch(NavRequest::MoveTo(self.target.clone()));
        }
        self.status = match self.task.poll_outcome() {
            Some(Ok(_)) => {
                self.blackboard.record_arrival(&self.target.unique_name);
                Status::Success
            }
            Some(Err(_e)) => {
                #[cfg(feature = "gopher_tracing")]
                tracing::warn!("[motion] navigation toward '{}' failed: {}", self.target.unique_name, _e);
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
        format!("moving to '{}'", self.target.unique_name)
    }

    fn activity(&self) -> Option<Activity> {
        (self.status == Status::Running).then_some(Activity::Travelling)
    }
}

/// Releases the robot from its parking dock before the first leg.
pub struct Undock<N> {
    task: NavTask<N>,
    status: Status,
}

impl<N> Undock<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(nav: N) -> Self {
        Self { task: NavTask::new(nav), status: Status::Invalid }
    }
}

impl<N> Behaviour for Undock<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    fn name(&self) -> &str {
        "undock"
    }

    fn tick(&mut self) -> Status {
        if self.status != Status::Running {
            self.task.dispatch(NavRequest::Undock);
        }
        self.status = match self.task.poll_outcome() {
            Some(Ok(_)) => Status::Success,
            Some(Err(_)) => Status::Failure,
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
        "undocking".to_string()
    }

    fn activity(&self) -> Option<Activity> {
        (self.status == Status::Running).then_some(Activity::Travelling)
    }
}
