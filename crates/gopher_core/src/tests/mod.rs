#[macro_use]
mod fixtures;

use fixtures::sample_semantics;
use tower::Service;

use crate::{
    delivery::{
        api::types::{DeliveryState, GoalRequest, GoalResponse},
        config::DeliveryConfig,
        core::interaction::{Button, LedPattern},
        error::DeliveryError,
        init_delivery,
    },
    transport::{loopback::spawn_sim_delivery, nop::NavNop},
};

#[tokio::test]
async fn integration_single_stop_delivery() {
    // flowchart LR
    //     G([Goal: sofa]) --> U[undock]
    //     U --> M[move to sofa]
    //     M --> D([delivered])
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, _, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();

    let goal_id = submit_goal!(goal_service, ["sofa"], false);
    assert_eq!(goal_id, 1);

    settle!(engine, 1);
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Travelling);
    assert_eq!(feedback.remaining, vec!["sofa".to_string()]);

    settle!(engine, 8);
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Idle);
    assert_eq!(feedback.traversed, vec!["sofa".to_string()]);
    assert!(feedback.remaining.is_empty());
}

#[tokio::test]
async fn integration_multi_stop_waits_for_go() {
    // flowchart LR
    //     M1[move to sofa] --> W[wait for go button]
    //     W -. go pressed .-> M2[move to kitchen]
    //     M2 --> D([delivered])
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, mut operator_service, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();

    submit_goal!(goal_service, ["sofa", "kitchen"]);
    settle!(engine, 5);

    // Holding at the sofa until a human sends the robot onward.
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Waiting);
    assert_eq!(feedback.traversed, vec!["sofa".to_string()]);
    assert_eq!(feedback.remaining, vec!["kitchen".to_string()]);
    assert!(feedback.message.contains("remaining"));

    // The hold survives further ticks.
    settle!(engine, 3);
    assert_eq!(feedback!(goal_service).state, DeliveryState::Waiting);

    press!(operator_service, Button::Go);
    settle!(engine, 8);
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Idle);
    assert_eq!(feedback.traversed, vec!["sofa".to_string(), "kitchen".to_string()]);
}

#[tokio::test]
async fn integration_express_skips_waiting() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let config = DeliveryConfig { express: true, ..Default::default() };
    let (mut goal_service, mut operator_service, engine) =
        init_delivery(config, sample_semantics(), NavNop).unwrap();
    let mut notifications = watch_notifications!(operator_service);

    submit_goal!(goal_service, ["sofa", "kitchen"]);
    settle!(engine, 10);

    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Idle);
    assert_eq!(feedback.traversed, vec!["sofa".to_string(), "kitchen".to_string()]);
    // No stop was held, so nothing ever prompted the interaction hardware.
    assert!(notifications.try_recv().is_err());
}

#[tokio::test]
async fn integration_goal_admission_rules() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, _, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();

    let empty: [&str; 0] = [];
    assert_eq!(submit_goal_err!(goal_service, empty), DeliveryError::EmptyGoal);
    assert_eq!(
        submit_goal_err!(goal_service, ["void"]),
        DeliveryError::UnknownLocation("void".to_string())
    );

    submit_goal!(goal_service, ["sofa", "kitchen"]);
    settle!(engine, 1);
    // Travelling toward the sofa: busy.
    assert_eq!(submit_goal_err!(goal_service, ["kitchen"]), DeliveryError::AlreadyAssignedGoal);

    settle!(engine, 5);
    assert_eq!(feedback!(goal_service).state, DeliveryState::Waiting);

    // Holding at a stop: a new goal pre-empts the current one.
    let goal_id = submit_goal!(goal_service, ["kitchen"]);
    assert_eq!(goal_id, 2);
    settle!(engine, 8);
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Idle);
    // The pre-empting run keeps the already traversed stops in feedback.
    assert_eq!(feedback.traversed, vec!["sofa".to_string(), "kitchen".to_string()]);
}

#[tokio::test]
async fn integration_cancel_runs_recovery() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, mut operator_service, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();
    let mut notifications = watch_notifications!(operator_service);

    submit_goal!(goal_service, ["sofa", "kitchen"]);
    settle!(engine, 5);
    assert_eq!(feedback!(goal_service).state, DeliveryState::Waiting);

    cancel!(goal_service);
    settle!(engine, 1);

    // Recovery toward homebase reports as waiting and refuses new goals.
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Waiting);
    assert!(feedback.message.contains("delivery cancelled"));
    assert_eq!(submit_goal_err!(goal_service, ["kitchen"]), DeliveryError::AlreadyAssignedGoal);

    settle!(engine, 8);
    assert_eq!(feedback!(goal_service).state, DeliveryState::Idle);

    // The hardware was told about the aborted run.
    let mut saw_cancellation = false;
    while let Ok(notification) = notifications.try_recv() {
        if notification.led_pattern == LedPattern::Error
            && notification.message.contains("delivery cancelled")
        {
            saw_cancellation = true;
        }
    }
    assert!(saw_cancellation);

    // Back home, the robot accepts goals again.
    submit_goal!(goal_service, ["kitchen"]);
}

#[tokio::test]
async fn integration_failure_recovers_to_homebase() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, mut operator_service, engine, sim) =
        spawn_sim_delivery(DeliveryConfig::default(), sample_semantics(), 0, 0).unwrap();
    let mut notifications = watch_notifications!(operator_service);

    sim.fail_next_leg();
    submit_goal!(goal_service, ["sofa"]);
    settle!(engine, 2);

    // The failed run hands over to the recovery branch.
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Waiting);
    assert!(feedback.message.contains("delivery failed"));

    settle!(engine, 8);
    let feedback = feedback!(goal_service);
    assert_eq!(feedback.state, DeliveryState::Idle);
    assert!(feedback.traversed.is_empty());

    let mut saw_failure = false;
    while let Ok(notification) = notifications.try_recv() {
        if notification.message.contains("delivery failed") {
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn integration_feedback_watch_follows_goal() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, _, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();

    let GoalResponse::FeedbackWatch(watch) =
        goal_service.call(GoalRequest::WatchFeedback).await.unwrap()
    else {
        panic!("Expected GoalResponse::FeedbackWatch");
    };
    assert_eq!(watch.borrow().goal_id, 0);

    submit_goal!(goal_service, ["sofa"]);
    settle!(engine, 8);

    let feedback = watch.borrow().clone();
    assert_eq!(feedback.goal_id, 1);
    assert_eq!(feedback.state, DeliveryState::Idle);
    assert_eq!(feedback.traversed, vec!["sofa".to_string()]);
}

#[tokio::test]
async fn integration_cancel_while_idle_is_harmless() {
    #[cfg(feature = "gopher_tracing")]
    crate::gopher_tracing::init();
    let (mut goal_service, _, engine) =
        init_delivery(DeliveryConfig::default(), sample_semantics(), NavNop).unwrap();

    cancel!(goal_service);
    settle!(engine, 2);
    assert_eq!(feedback!(goal_service).state, DeliveryState::Idle);

    // A delivery after the stray cancel still runs to completion.
    submit_goal!(goal_service, ["sofa"]);
    settle!(engine, 8);
    assert_eq!(feedback!(goal_service).traversed, vec!["sofa".to_string()]);
}
