use criterion::{Criterion, black_box, criterion_group, criterion_main};
use gopher_core::{
    delivery::{
        api::types::{DeliveryGoal, GoalRequest},
        config::DeliveryConfig,
        core::semantics::{Location, Pose2D, SemanticMap},
        init_delivery,
    },
    transport::nop::NavNop,
};
use tower::Service;

fn bench_semantics() -> SemanticMap {
    let semantics = SemanticMap::new();
    for (index, name) in ["homebase", "sofa", "kitchen", "desk"].iter().enumerate() {
        semantics.insert(Location {
            unique_name: name.to_string(),
            name: name.to_string(),
            description: String::new(),
            pose: Pose2D { x: index as f64, y: 0.0, theta: 0.0 },
            keyframe_id: index as i32,
        });
    }
    semantics
}

fn bench_goal_admission(c: &mut Criterion) {
    c.bench_function("goal_admission", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap()).iter(|| async {
            let (mut goal_service, _, _engine) =
                init_delivery(DeliveryConfig::default(), bench_semantics(), NavNop).unwrap();
            let _ = black_box(
                goal_service
                    .call(GoalRequest::Submit(DeliveryGoal {
                        locations: vec!["sofa".to_string(), "kitchen".to_string()],
                        assume_initialised: true,
                    }))
                    .await,
            );
        });
    });
}

fn bench_express_delivery_ticks(c: &mut Criterion) {
    c.bench_function("express_delivery_ticks", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap()).iter(|| async {
            let config = DeliveryConfig { express: true, ..Default::default() };
            let (mut goal_service, _, engine) =
                init_delivery(config, bench_semantics(), NavNop).unwrap();
            goal_service
                .call(GoalRequest::Submit(DeliveryGoal {
                    locations: vec!["sofa".to_string(), "kitchen".to_string(), "desk".to_string()],
                    assume_initialised: true,
                }))
                .await
                .unwrap();
            for _ in 0..12 {
                engine.tick_once().await;
                tokio::task::yield_now().await;
            }
            black_box(());
        });
    });
}

criterion_group!(benches, bench_goal_admission, bench_express_delivery_ticks);
criterion_main!(benches);
