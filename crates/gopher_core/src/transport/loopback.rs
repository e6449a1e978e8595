//! Simulated navigation base for in-process testing.
//!
//! `NavSim` stands in for the robot base: each leg takes a configurable
//! base delay plus jitter, and the next leg can be forced to fail to
//! exercise the recovery paths. `spawn_sim_delivery` wires a complete
//! delivery stack around it.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::Poll,
    time::Instant,
};

use tokio::time::Duration;
use tower::Service;

use crate::delivery::{
    api::{
        goal::GoalApiService,
        operator::OperatorApiService,
        types::{NavRequest, NavResponse},
    },
    config::DeliveryConfig,
    core::{engine::DeliveryEngine, semantics::SemanticMap},
    error::DeliveryError,
    init_delivery,
};

/// Wire a delivery stack around a simulated base.
///
/// Returns the two service facades, the engine (not yet running) and the
/// simulator handle for failure injection.
pub fn spawn_sim_delivery(
    config: DeliveryConfig,
    semantics: SemanticMap,
    base_delay_ms: u64,
    jitter_max_ms: u64,
) -> Result<
    (GoalApiService<NavSim>, OperatorApiService, DeliveryEngine<NavSim>, NavSim),
    DeliveryError,
> {
    let sim = NavSim::new(base_delay_ms, jitter_max_ms);
    let (goal_service, operator_service, engine) =
        init_delivery(config, semantics, sim.clone())?;
    Ok((goal_service, operator_service, engine, sim))
}

/// Simulated navigation base.
///
/// Thread-safe and cheaply clonable; all clones share the failure switch.
#[derive(Clone)]
pub struct NavSim {
    /// Base travel time per leg in milliseconds.
    base_delay_ms: u64,
    /// Maximum additional random delay in milliseconds.
    jitter_max_ms: u64,
    /// When set, the next leg fails and the switch clears itself.
    fail_next: Arc<AtomicBool>,
    started: Instant,
}

impl Default for NavSim {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl NavSim {
    pub fn new(base_delay_ms: u64, jitter_max_ms: u64) -> Self {
        Self {
            base_delay_ms,
            jitter_max_ms,
            fail_next: Arc::new(AtomicBool::new(false)),
            started: Instant::now(),
        }
    }

    /// Force the next navigation leg to fail.
    pub fn fail_next_leg(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn travel_time(&self) -> Duration {
        let base = Duration::from_millis(self.base_delay_ms);
        if self.jitter_max_ms == 0 {
            return base;
        }
        // Simple entropy based on elapsed time
        let seed = self.started.elapsed().as_nanos() as u64;
        base + Duration::from_millis(seed % (self.jitter_max_ms + 1))
    }
}

impl Service<NavRequest> for NavSim {
    type Response = NavResponse;
    type Error = DeliveryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: NavRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            let travel_time = this.travel_time();
            if !travel_time.is_zero() {
                tokio::time::sleep(travel_time).await;
            }
            if this.fail_next.swap(false, Ordering::SeqCst) {
                let leg = match &request {
                    NavRequest::MoveTo(location) => location.unique_name.clone(),
                    NavRequest::Undock => "undock".to_string(),
                };
                return Err(DeliveryError::NavigationFailed(leg));
            }
            match request {
                NavRequest::MoveTo(_) => Ok(NavResponse::Arrived),
                NavRequest::Undock => Ok(NavResponse::Undocked),
            }
        })
    }
}
