//! Delivery API type definitions.
//!
//! The external surface of the middleware is organised in two service
//! facades plus the navigation client contract:
//!
//! - **Goal API**: submit, cancel and observe deliveries.
//! - **Operator API**: press buttons on behalf of a human, watch the
//!   interaction hardware notifications, and manage the semantic map.
//! - **Nav client**: the contract the middleware expects from the robot
//!   base, one blocking call per navigation leg.

use tokio::sync::{broadcast, watch};

use crate::delivery::core::{
    interaction::{Button, Notification},
    semantics::Location,
};

/// A delivery goal: where to go, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeliveryGoal {
    /// Semantic location names, visited front to back.
    pub locations: Vec<String>,
    /// Skip the undocking leg even on the robot's first run.
    pub assume_initialised: bool,
}

/// Published delivery state.
///
/// Discriminants are the wire feedback codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryState {
    /// No current goal.
    #[default]
    Idle = 0,
    /// Holding at a stop (or recovering) until a human interaction.
    Waiting = 1,
    /// Moving between locations.
    Travelling = 2,
    /// The coordinator is in an unusable state.
    Invalid = 3,
}

/// Snapshot published through the feedback watch channel on every tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeliveryFeedback {
    /// Identifier of the goal the feedback refers to; 0 before any goal.
    pub goal_id: u64,
    pub state: DeliveryState,
    pub message: String,
    pub traversed: Vec<String>,
    pub remaining: Vec<String>,
}

/// Goal API request types.
#[derive(Debug, Clone)]
pub enum GoalRequest {
    /// Submit a new delivery goal.
    ///
    /// Accepted while idle or while holding at a stop (pre-emption);
    /// rejected while travelling or recovering.
    Submit(DeliveryGoal),
    /// Cancel the active delivery. Equivalent to pressing the stop button.
    Cancel,
    /// Snapshot of the latest feedback.
    Feedback,
    /// Watch channel delivering one feedback snapshot per engine tick.
    WatchFeedback,
}

/// Goal API response types.
#[derive(Debug)]
pub enum GoalResponse {
    /// Goal admitted, with the identifier feedback will carry for it.
    Accepted(u64),
    Ack,
    Feedback(DeliveryFeedback),
    FeedbackWatch(watch::Receiver<DeliveryFeedback>),
}

/// Operator API request types.
#[derive(Debug, Clone)]
pub enum OperatorRequest {
    /// Press a hardware button on behalf of a human.
    Press(Button),
    /// Notification feed for the interaction hardware.
    WatchNotifications,
    /// Register a semantic location on the running daemon.
    AddLocation(Location),
    /// All known locations, sorted by unique name.
    GetLocations,
    /// A single location by unique name.
    GetLocation(String),
}

/// Operator API response types.
#[derive(Debug)]
pub enum OperatorResponse {
    Ack,
    Notifications(broadcast::Receiver<Notification>),
    Locations(Vec<Location>),
    Location(Location),
}

/// Navigation client request types.
///
/// The client is any `tower::Service<NavRequest, Response = NavResponse,
/// Error = DeliveryError>`; implementations live under `transport`.
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    /// Drive to the given location and block until arrival.
    MoveTo(Location),
    /// Release the robot from its parking dock.
    Undock,
}

/// Navigation client response types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavResponse {
    Arrived,
    Undocked,
}
