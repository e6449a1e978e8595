//! Goal to behaviour tree assembly.

use tower::Service;

use crate::delivery::{
    api::types::{DeliveryGoal, NavRequest, NavResponse},
    behaviours::{
        Behaviour,
        composites::{OneshotSequence, Selector, Sequence},
        interactions::CheckButtonPressed,
        motion::{MoveTo, Undock},
        recovery::HomebaseRecovery,
        waiting::Waiting,
    },
    core::{
        blackboard::Blackboard,
        interaction::{Button, Interactions},
        semantics::SemanticMap,
    },
    error::DeliveryError,
};

/// Assembles the delivery subtree for a goal and tracks the last confirmed
/// location of the robot.
///
/// The tree has a fixed shape:
///
/// ```text
/// Selector "deliver or abort"
/// ├── Sequence "cancellation"
/// │   ├── CheckButtonPressed (stop, latched)
/// │   └── HomebaseRecovery "delivery cancelled"
/// └── Selector "deliver or recover"
///     ├── OneshotSequence "delivery run"
///     │   ├── [Undock]
///     │   └── per stop: MoveTo, Waiting (none after the final stop)
///     └── HomebaseRecovery "delivery failed"
/// ```
pub struct Planner<N> {
    semantics: SemanticMap,
    interactions: Interactions,
    blackboard: Blackboard,
    nav: N,
    express: bool,
    current_location: Option<String>,
}

impl<N> Planner<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(
        semantics: SemanticMap,
        interactions: Interactions,
        blackboard: Blackboard,
        nav: N,
        express: bool,
    ) -> Self {
        Self { semantics, interactions, blackboard, nav, express, current_location: None }
    }

    pub fn check_locations(&self, names: &[String]) -> Result<(), DeliveryError> {
        self.semantics.check_locations(names)
    }

    pub fn current_location(&self) -> Option<&str> {
        self.current_location.as_deref()
    }

    pub fn set_current_location(&mut self, location: Option<String>) {
        self.current_location = location;
    }

    /// Build the tree for a goal.
    ///
    /// `include_undock` prepends the undocking leg, used on the robot's
    /// first run unless the goal assumes an initialised robot.
    pub fn create_tree(
        &self,
        goal: &DeliveryGoal,
        include_undock: bool,
    ) -> Result<Box<dyn Behaviour>, DeliveryError> {
        if goal.locations.is_empty() {
            return Err(DeliveryError::EmptyGoal);
        }
        self.check_locations(&goal.locations)?;
        let homebase = self.semantics.homebase()?;

        let mut run: Vec<Box<dyn Behaviour>> = Vec::new();
        if include_undock {
            run.push(Box::new(Undock::new(self.nav.clone())));
        }
        let last = goal.locations.len() - 1;
        for (index, name) in goal.locations.iter().enumerate() {
            let location = self
                .semantics
                .get(name)
                .ok_or_else(|| DeliveryError::UnknownLocation(name.to_owned()))?;
            run.push(Box::new(MoveTo::new(location, self.nav.clone(), self.blackboard.clone())));
            if index != last {
                run.push(Box::new(Waiting::new(
                    name,
                    self.interactions.clone(),
                    self.blackboard.clone(),
                    self.express,
                )));
            }
        }

        let cancellation = Sequence::new(
            "cancellation",
            vec![
                Box::new(CheckButtonPressed::new("cancel pressed?", &self.interactions, Button::Stop)),
                Box::new(HomebaseRecovery::new(
                    "delivery cancelled",
                    homebase.clone(),
                    self.nav.clone(),
                    self.interactions.clone(),
                )),
            ],
        );
        let deliver_or_recover = Selector::new(
            "deliver or recover",
            vec![
                Box::new(OneshotSequence::new("delivery run", run)),
                Box::new(HomebaseRecovery::new(
                    "delivery failed",
                    homebase,
                    self.nav.clone(),
                    self.interactions.clone(),
                )),
            ],
        );

        #[cfg(feature = "gopher_tracing")]
        tracing::info!("[planner] assembled tree for {:?}", goal.locations);

        Ok(Box::new(Selector::new(
            "deliver or abort",
            vec![Box::new(cancellation), Box::new(deliver_or_recover)],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{delivery::behaviours::Status, transport::nop::NavNop};

    fn sample_planner() -> Planner<NavNop> {
        let semantics = SemanticMap::from_toml_str(
            r#"
            [locations.homebase]
            name = "Homebase"
            pose = { x = 0.0, y = 0.0, theta = 0.0 }

            [locations.sofa]
            name = "Sofa"
            pose = { x = 2.0, y = 1.0, theta = 0.0 }
        "#,
        )
        .unwrap();
        Planner::new(semantics, Interactions::new(), Blackboard::new(), NavNop, false)
    }

    #[tokio::test]
    async fn test_create_tree_rejects_unknown_locations() {
        let planner = sample_planner();
        let goal =
            DeliveryGoal { locations: vec!["void".to_string()], assume_initialised: false };
        assert_eq!(
            planner.create_tree(&goal, false).err(),
            Some(DeliveryError::UnknownLocation("void".to_string()))
        );
    }

    #[tokio::test]
    async fn test_created_tree_starts_invalid_and_runs() {
        let planner = sample_planner();
        let goal =
            DeliveryGoal { locations: vec!["sofa".to_string()], assume_initialised: true };
        let mut root = planner.create_tree(&goal, false).unwrap();
        assert_eq!(root.status(), Status::Invalid);
        assert_eq!(root.tick(), Status::Running);
    }
}
