//! Goal API service.

use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use tokio::sync::{Mutex, watch};
use tower::Service;

use crate::delivery::{
    api::types::{DeliveryFeedback, GoalRequest, GoalResponse, NavRequest, NavResponse},
    core::{
        deliveries::Deliveries,
        interaction::{Button, Interactions},
    },
    error::DeliveryError,
};

/// Facade through which deliveries are submitted, cancelled and observed.
///
/// Cancellation presses the stop button: the behaviour tree's cancellation
/// branch picks it up at the next tick, exactly as a physical press would.
#[derive(Clone)]
pub struct GoalApiService<N> {
    deliveries: Arc<Mutex<Deliveries<N>>>,
    interactions: Interactions,
    feedback: watch::Receiver<DeliveryFeedback>,
}

impl<N> GoalApiService<N> {
    pub fn new(
        deliveries: Arc<Mutex<Deliveries<N>>>,
        interactions: Interactions,
        feedback: watch::Receiver<DeliveryFeedback>,
    ) -> Self {
        Self { deliveries, interactions, feedback }
    }
}

impl<N> Service<GoalRequest> for GoalApiService<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    type Response = GoalResponse;
    type Error = DeliveryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: GoalRequest) -> Self::Future {
        let deliveries = self.deliveries.clone();
        let interactions = self.interactions.clone();
        let feedback = self.feedback.clone();
        Box::pin(async move {
            match request {
                GoalRequest::Submit(goal) => {
                    #[cfg(feature = "gopher_tracing")]
                    tracing::info!("[goal] Submit: {:?}", goal.locations);
                    deliveries.lock().await.set_goal(goal).map(GoalResponse::Accepted)
                }
                GoalRequest::Cancel => {
                    #[cfg(feature = "gopher_tracing")]
                    tracing::info!("[goal] Cancel");
                    interactions.press(Button::Stop);
                    Ok(GoalResponse::Ack)
                }
                GoalRequest::Feedback => Ok(GoalResponse::Feedback(feedback.borrow().clone())),
                GoalRequest::WatchFeedback => Ok(GoalResponse::FeedbackWatch(feedback)),
            }
        })
    }
}
