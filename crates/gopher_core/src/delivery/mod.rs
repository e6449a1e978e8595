//! Delivery module.
//!
//! Coordinates an indoor delivery robot through ordered lists of semantic
//! locations. A goal is turned into a behaviour tree that drives the robot
//! stop by stop, holds at each intermediate stop until a human presses the
//! go button, can be cancelled through the stop button, and recovers back
//! to the homebase dock when a run is cancelled or fails.
//!
//! ## Architecture
//!
//! The [`core::deliveries::Deliveries`] coordinator owns the active tree and
//! the published state machine; the [`core::engine::DeliveryEngine`] ticks it
//! at a fixed period. Two tower service facades form the external surface:
//!
//! - [`api::goal::GoalApiService`] for goal submission, cancellation and
//!   feedback,
//! - [`api::operator::OperatorApiService`] for button presses, notification
//!   feeds and semantic map administration.
//!
//! Navigation is abstracted behind a tower client (`NavRequest` →
//! `NavResponse`); implementations live under [`crate::transport`].

pub mod api;
pub mod behaviours;
pub mod config;
pub mod core;
pub mod error;

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tower::Service;

use crate::delivery::{
    api::{
        goal::GoalApiService,
        operator::OperatorApiService,
        types::{NavRequest, NavResponse},
    },
    config::DeliveryConfig,
    core::{
        blackboard::Blackboard, deliveries::Deliveries, engine::DeliveryEngine,
        interaction::Interactions, planner::Planner, semantics::SemanticMap,
    },
    error::DeliveryError,
};

/// Wire up a complete delivery stack around a navigation client.
///
/// Fails fast when the semantic map has no homebase entry, since every
/// recovery path depends on it. The returned engine is not yet running:
/// call [`DeliveryEngine::spawn`] (daemon) or drive
/// [`DeliveryEngine::tick_once`] manually (tests).
pub fn init_delivery<N>(
    config: DeliveryConfig,
    semantics: SemanticMap,
    nav: N,
) -> Result<(GoalApiService<N>, OperatorApiService, DeliveryEngine<N>), DeliveryError>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    semantics.homebase()?;

    let blackboard = Blackboard::new();
    let interactions = Interactions::new();
    let planner = Planner::new(
        semantics.clone(),
        interactions.clone(),
        blackboard.clone(),
        nav,
        config.express,
    );
    let deliveries = Arc::new(Mutex::new(Deliveries::new(planner, blackboard)));
    let (engine, feedback) =
        DeliveryEngine::new(deliveries.clone(), Duration::from_millis(config.tick_period_ms));

    let goal_service = GoalApiService::new(deliveries, interactions.clone(), feedback);
    let operator_service = OperatorApiService::new(semantics, interactions);

    Ok((goal_service, operator_service, engine))
}
