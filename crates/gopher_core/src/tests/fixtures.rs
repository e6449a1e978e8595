use crate::delivery::core::semantics::SemanticMap;

/// A small household map with the mandatory homebase entry.
pub(super) fn sample_semantics() -> SemanticMap {
    SemanticMap::from_toml_str(
        r#"
        [locations.homebase]
        name = "Homebase"
        description = "charging dock"
        pose = { x = 0.0, y = 0.0, theta = 0.0 }
        keyframe_id = 1

        [locations.sofa]
        name = "Sofa"
        description = "living room sofa"
        pose = { x = 2.5, y = -1.0, theta = 1.57 }
        keyframe_id = 4

        [locations.kitchen]
        name = "Kitchen"
        description = "kitchen bench"
        pose = { x = -1.0, y = 3.0, theta = 3.14 }
        keyframe_id = 9
    "#,
    )
    .unwrap()
}

/// Run the engine for a number of ticks, yielding between ticks so spawned
/// navigation calls can land.
macro_rules! settle {
    ($engine:expr, $ticks:expr) => {
        for _ in 0..$ticks {
            $engine.tick_once().await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    };
}

macro_rules! submit_goal {
    ($goal_service:expr, $locations:expr) => {
        submit_goal!($goal_service, $locations, true)
    };
    ($goal_service:expr, $locations:expr, $assume_initialised:expr) => {
        match $goal_service
            .call(crate::delivery::api::GoalRequest::Submit(crate::delivery::api::DeliveryGoal {
                locations: $locations.iter().map(|name| name.to_string()).collect(),
                assume_initialised: $assume_initialised,
            }))
            .await
            .unwrap()
        {
            crate::delivery::api::GoalResponse::Accepted(goal_id) => goal_id,
            other => panic!("Expected GoalResponse::Accepted, got {:?}", other),
        }
    };
}

macro_rules! submit_goal_err {
    ($goal_service:expr, $locations:expr) => {
        $goal_service
            .call(crate::delivery::api::GoalRequest::Submit(crate::delivery::api::DeliveryGoal {
                locations: $locations.iter().map(|name| name.to_string()).collect(),
                assume_initialised: true,
            }))
            .await
            .unwrap_err()
    };
}

macro_rules! cancel {
    ($goal_service:expr) => {
        assert!(matches!(
            $goal_service.call(crate::delivery::api::GoalRequest::Cancel).await.unwrap(),
            crate::delivery::api::GoalResponse::Ack
        ))
    };
}

macro_rules! feedback {
    ($goal_service:expr) => {
        match $goal_service.call(crate::delivery::api::GoalRequest::Feedback).await.unwrap() {
            crate::delivery::api::GoalResponse::Feedback(feedback) => feedback,
            other => panic!("Expected GoalResponse::Feedback, got {:?}", other),
        }
    };
}

macro_rules! press {
    ($operator:expr, $button:expr) => {
        assert!(matches!(
            $operator
                .call(crate::delivery::api::OperatorRequest::Press($button))
                .await
                .unwrap(),
            crate::delivery::api::OperatorResponse::Ack
        ))
    };
}

macro_rules! watch_notifications {
    ($operator:expr) => {
        match $operator
            .call(crate::delivery::api::OperatorRequest::WatchNotifications)
            .await
            .unwrap()
        {
            crate::delivery::api::OperatorResponse::Notifications(feed) => feed,
            other => panic!("Expected OperatorResponse::Notifications, got {:?}", other),
        }
    };
}
