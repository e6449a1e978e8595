//! Delivery coordinator.
//!
//! Owns the active behaviour tree and the published state machine, and
//! decides which goals are admitted. The engine calls the three update
//! hooks once per tick, in order: [`Deliveries::pre_tick_update`],
//! [`Deliveries::tick`], [`Deliveries::post_tick_update`].

use tower::Service;

use crate::delivery::{
    api::types::{DeliveryFeedback, DeliveryGoal, DeliveryState, NavRequest, NavResponse},
    behaviours::{Activity, Behaviour, Status},
    core::{blackboard::Blackboard, planner::Planner, semantics::HOMEBASE},
    error::DeliveryError,
};

pub struct Deliveries<N> {
    planner: Planner<N>,
    blackboard: Blackboard,
    root: Option<Box<dyn Behaviour>>,
    state: DeliveryState,
    incoming_goal: Option<DeliveryGoal>,
    goal_id: u64,
    feedback_message: String,
    /// Set while a recovery behaviour is driving the robot home; goal
    /// admission stays closed until it finishes.
    recovering: bool,
}

impl<N> Deliveries<N>
where
    N: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Send
        + 'static,
    N::Future: Send,
{
    pub fn new(planner: Planner<N>, blackboard: Blackboard) -> Self {
        Self {
            planner,
            blackboard,
            root: None,
            state: DeliveryState::Idle,
            incoming_goal: None,
            goal_id: 0,
            feedback_message: "idling".to_string(),
            recovering: false,
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Goal admission.
    ///
    /// Accepted while idle, or while holding at a stop (the staged goal
    /// pre-empts the current one at the next tick). Rejected while
    /// travelling between locations and while recovering toward homebase.
    pub fn set_goal(&mut self, goal: DeliveryGoal) -> Result<u64, DeliveryError> {
        if goal.locations.is_empty() {
            return Err(DeliveryError::EmptyGoal);
        }
        if self.recovering {
            return Err(DeliveryError::AlreadyAssignedGoal);
        }
        match self.state {
            DeliveryState::Idle | DeliveryState::Waiting => {
                self.planner.check_locations(&goal.locations)?;
                #[cfg(feature = "gopher_tracing")]
                tracing::info!(
                    "[deliveries] goal accepted: {:?} (pre-empting: {})",
                    goal.locations,
                    self.state == DeliveryState::Waiting
                );
                self.incoming_goal = Some(goal);
                self.goal_id += 1;
                Ok(self.goal_id)
            }
            DeliveryState::Travelling => Err(DeliveryError::AlreadyAssignedGoal),
            DeliveryState::Invalid => Err(DeliveryError::InternalDeliveryError),
        }
    }

    /// Swap in a staged goal, or retire a finished tree.
    pub fn pre_tick_update(&mut self) {
        if let Some(goal) = self.incoming_goal.take() {
            // Undocking legs are only needed when the robot is still parked:
            // a live root means it is already out on the floor.
            let include_undock = !(goal.assume_initialised || self.root.is_some());
            match self.planner.create_tree(&goal, include_undock) {
                Ok(root) => {
                    let keep_traversed = self.root.is_some();
                    self.blackboard.start_run(goal.locations, keep_traversed);
                    self.root = Some(root);
                    self.recovering = false;
                }
                Err(_e) => {
                    #[cfg(feature = "gopher_tracing")]
                    tracing::warn!("[deliveries] staged goal could not be planned: {}", _e);
                }
            }
        } else if let Some(root) = &self.root
            && matches!(root.status(), Status::Success | Status::Failure)
        {
            if root.status() == Status::Success {
                let location = if self.recovering {
                    Some(HOMEBASE.to_string())
                } else {
                    self.blackboard.last_traversed()
                };
                self.planner.set_current_location(location);
            }
            self.root = None;
            self.recovering = false;
        }
    }

    /// Tick the active tree once, if any.
    pub fn tick(&mut self) {
        if let Some(root) = &mut self.root {
            root.tick();
        }
    }

    /// Derive the published state and feedback message from the tree.
    pub fn post_tick_update(&mut self) {
        match &self.root {
            Some(root) if root.status() == Status::Running => match root.activity() {
                Some(Activity::Travelling) => {
                    self.state = DeliveryState::Travelling;
                    let traversed = self.blackboard.traversed_locations();
                    let remaining = self.blackboard.remaining_locations();
                    self.feedback_message = match (traversed.last(), remaining.first()) {
                        (Some(from), Some(to)) => format!("moving from '{from}' to '{to}'"),
                        (None, Some(to)) => format!("moving to '{to}'"),
                        _ => root.feedback_message(),
                    };
                }
                Some(Activity::Waiting) => {
                    self.state = DeliveryState::Waiting;
                    self.feedback_message = root.feedback_message();
                }
                Some(Activity::Recovering) => {
                    // Recovery reports as waiting but keeps admission closed.
                    self.recovering = true;
                    self.state = DeliveryState::Waiting;
                    self.feedback_message = root.feedback_message();
                }
                None => {}
            },
            _ => {
                self.state = DeliveryState::Idle;
                self.feedback_message = "idling".to_string();
            }
        }
    }

    /// Is the robot currently mid-delivery?
    pub fn is_executing(&self) -> bool {
        matches!(self.state, DeliveryState::Waiting | DeliveryState::Travelling)
    }

    /// Did the active tree succeed on the last tick?
    pub fn succeeded_on_last_tick(&self) -> bool {
        self.root.as_ref().is_some_and(|root| root.status() == Status::Success)
    }

    pub fn current_location(&self) -> Option<&str> {
        self.planner.current_location()
    }

    pub fn feedback(&self) -> DeliveryFeedback {
        DeliveryFeedback {
            goal_id: self.goal_id,
            state: self.state,
            message: self.feedback_message.clone(),
            traversed: self.blackboard.traversed_locations(),
            remaining: self.blackboard.remaining_locations(),
        }
    }
}
