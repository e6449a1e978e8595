//! Tick loop driving the coordinator.

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, watch};
use tower::Service;

use crate::delivery::{
    api::types::{DeliveryFeedback, NavRequest, NavResponse},
    core::deliveries::Deliveries,
    error::DeliveryError,
};

/// Ticks the coordinator at a fixed period and publishes feedback after
/// every tick.
///
/// Tests drive [`DeliveryEngine::tick_once`] directly for determinism; the
/// daemon calls [`DeliveryEngine::spawn`].
pub struct DeliveryEngine<N> {
    deliveries: Arc<Mutex<Deliveries<N>>>,
    feedback: watch::Sender<DeliveryFeedback>,
    period: Duration,
}

impl<N> DeliveryEngine<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(
        deliveries: Arc<Mutex<Deliveries<N>>>,
        period: Duration,
    ) -> (Self, watch::Receiver<DeliveryFeedback>) {
        let (feedback, feedback_rx) = watch::channel(DeliveryFeedback::default());
        (Self { deliveries, feedback, period }, feedback_rx)
    }

    /// One full engine cycle: swap goals, tick the tree, publish feedback.
    pub async fn tick_once(&self) {
        let mut deliveries = self.deliveries.lock().await;
        deliveries.pre_tick_update();
        deliveries.tick();
        deliveries.post_tick_update();
        let _ = self.feedback.send(deliveries.feedback());
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period);
            loop {
                interval.tick().await;
                self.tick_once().await;
            }
        })
    }
}
