//! gRPC transport.
//!
//! Server-side handlers exposing the goal and operator facades as the
//! `gopher.GopherDelivery` service, the `gopher.NavBase` server wrapper used
//! by the simulated base, and the `NavGrpc` client the daemon uses to reach
//! a real (or simulated) navigation base. Conversions between internal and
//! protobuf types live at the bottom of the module.

use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use tokio_stream::{StreamExt, wrappers::{BroadcastStream, WatchStream}};
use tonic::{Request, Response, Status, transport::Channel};
use tower::{Service, ServiceExt};

/// Default port of the delivery daemon.
pub const DEFAULT_GRPC_PORT: u16 = 50061;

/// Default port of the navigation base server.
pub const DEFAULT_NAV_PORT: u16 = 50062;

/// Protocol Buffer definitions and the descriptor set for reflection.
pub mod proto {
    tonic::include_proto!("gopher");

    /// Pre-compiled Protocol Buffer descriptor set for service reflection.
    pub const GOPHER_DESCRIPTOR_SET: &[u8] = include_bytes!("../../gopher_descriptor.bin");
}

use crate::delivery::{
    api::types::{
        DeliveryFeedback, DeliveryGoal, DeliveryState, GoalRequest, GoalResponse, NavRequest,
        NavResponse, OperatorRequest, OperatorResponse,
    },
    core::{
        interaction::{Button, ButtonState, LedPattern, Notification},
        semantics::{Location, Pose2D},
    },
    error::DeliveryError,
};

/// Converts delivery errors to gRPC status codes for wire transmission.
impl From<DeliveryError> for Status {
    fn from(error: DeliveryError) -> Self {
        match &error {
            DeliveryError::EmptyGoal => Status::invalid_argument(error.to_string()),
            DeliveryError::AlreadyAssignedGoal => Status::failed_precondition(error.to_string()),
            DeliveryError::UnknownLocation(_) => Status::not_found(error.to_string()),
            DeliveryError::InvalidSemanticMap(_) | DeliveryError::MissingHomebase => {
                Status::invalid_argument(error.to_string())
            }
            _ => Status::internal(error.to_string()),
        }
    }
}

/// gRPC client for a navigation base server.
///
/// Connects lazily on the first leg and caches the connected client, so a
/// daemon started before its base comes up still recovers on its own.
#[derive(Clone)]
pub struct NavGrpc {
    /// Navigation base endpoint, e.g. "127.0.0.1:50062".
    endpoint: String,
    /// Connected client, keyed by endpoint.
    connected: Arc<DashMap<String, proto::nav_base_client::NavBaseClient<Channel>>>,
}

impl NavGrpc {
    pub fn new(endpoint: String) -> Self {
        Self { endpoint, connected: Arc::new(DashMap::new()) }
    }

    async fn connect(
        &self,
    ) -> Result<proto::nav_base_client::NavBaseClient<Channel>, DeliveryError> {
        match proto::nav_base_client::NavBaseClient::connect(format!("http://{}", self.endpoint))
            .await
        {
            Ok(client) => {
                self.connected.insert(self.endpoint.clone(), client.clone());
                Ok(client)
            }
            Err(_) => Err(DeliveryError::TransportFailedToContactBase(self.endpoint.clone())),
        }
    }

    async fn get_client_or_connect(
        &self,
    ) -> Result<proto::nav_base_client::NavBaseClient<Channel>, DeliveryError> {
        match self.connected.get(&self.endpoint).map(|client| client.to_owned()) {
            Some(client) => Ok(client),
            None => self.connect().await,
        }
    }
}

impl Service<NavRequest> for NavGrpc {
    type Response = NavResponse;
    type Error = DeliveryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: NavRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move {
            let mut client = this.get_client_or_connect().await?;
            match request {
                NavRequest::MoveTo(location) => {
                    let leg = location.unique_name.clone();
                    client
                        .move_to(Request::new(location.into()))
                        .await
                        .map_err(|_| DeliveryError::NavigationFailed(leg))?;
                    Ok(NavResponse::Arrived)
                }
                NavRequest::Undock => {
                    client
                        .undock(Request::new(proto::Empty {}))
                        .await
                        .map_err(|_| DeliveryError::NavigationFailed("undock".to_string()))?;
                    Ok(NavResponse::Undocked)
                }
            }
        })
    }
}

/// gRPC server handler for the delivery surface.
///
/// Routes incoming requests to the goal and operator facades and converts
/// responses back to protobuf.
pub struct DeliveryHandler<G, O> {
    goal: G,
    operator: O,
}

impl<G, O> DeliveryHandler<G, O> {
    pub fn new(goal: G, operator: O) -> Self {
        Self { goal, operator }
    }
}

#[tonic::async_trait]
impl<G, O> proto::gopher_delivery_server::GopherDelivery for DeliveryHandler<G, O>
where
    G: Service<GoalRequest, Response = GoalResponse, Error = DeliveryError>
        + Clone
        + Sync
        + Send
        + 'static,
    G::Future: Send,
    O: Service<OperatorRequest, Response = OperatorResponse, Error = DeliveryError>
        + Clone
        + Sync
        + Send
        + 'static,
    O::Future: Send,
{
    async fn submit_goal(
        &self,
        request: Request<proto::GoalSpec>,
    ) -> Result<Response<proto::GoalAck>, Status> {
        let req = request.into_inner();
        let mut goal = self.goal.clone();
        match goal
            .ready()
            .await?
            .call(GoalRequest::Submit(DeliveryGoal {
                locations: req.locations,
                assume_initialised: req.assume_initialised,
            }))
            .await?
        {
            GoalResponse::Accepted(goal_id) => Ok(Response::new(proto::GoalAck { goal_id })),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn cancel_delivery(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::Ack>, Status> {
        let mut goal = self.goal.clone();
        match goal.ready().await?.call(GoalRequest::Cancel).await? {
            GoalResponse::Ack => Ok(Response::new(proto::Ack {})),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn get_feedback(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::Feedback>, Status> {
        let mut goal = self.goal.clone();
        match goal.ready().await?.call(GoalRequest::Feedback).await? {
            GoalResponse::Feedback(feedback) => Ok(Response::new(feedback.into())),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    type StreamFeedbackStream =
        Pin<Box<dyn tokio_stream::Stream<Item = Result<proto::Feedback, Status>> + Send>>;

    /// One feedback message per engine tick, starting with the current one.
    async fn stream_feedback(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<Self::StreamFeedbackStream>, Status> {
        let mut goal = self.goal.clone();
        match goal.ready().await?.call(GoalRequest::WatchFeedback).await? {
            GoalResponse::FeedbackWatch(receiver) => {
                let stream = WatchStream::new(receiver).map(|feedback| Ok(feedback.into()));
                Ok(Response::new(Box::pin(stream)))
            }
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn press_button(
        &self,
        request: Request<proto::ButtonPress>,
    ) -> Result<Response<proto::Ack>, Status> {
        let req = request.into_inner();
        let button = proto::Button::try_from(req.button)
            .map_err(|_| Status::invalid_argument("unknown button"))?;
        let mut operator = self.operator.clone();
        match operator.ready().await?.call(OperatorRequest::Press(button.into())).await? {
            OperatorResponse::Ack => Ok(Response::new(proto::Ack {})),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    type WatchNotificationsStream =
        Pin<Box<dyn tokio_stream::Stream<Item = Result<proto::Notification, Status>> + Send>>;

    async fn watch_notifications(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<Self::WatchNotificationsStream>, Status> {
        let mut operator = self.operator.clone();
        match operator.ready().await?.call(OperatorRequest::WatchNotifications).await? {
            OperatorResponse::Notifications(receiver) => {
                let stream = BroadcastStream::new(receiver).map(|result| match result {
                    Ok(notification) => Ok(notification.into()),
                    Err(e) => Err(Status::internal(format!("Notification stream error: {e}"))),
                });
                Ok(Response::new(Box::pin(stream)))
            }
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn add_location(
        &self,
        request: Request<proto::Location>,
    ) -> Result<Response<proto::Ack>, Status> {
        let req = request.into_inner();
        let mut operator = self.operator.clone();
        match operator.ready().await?.call(OperatorRequest::AddLocation(req.into())).await? {
            OperatorResponse::Ack => Ok(Response::new(proto::Ack {})),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn get_locations(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::LocationList>, Status> {
        let mut operator = self.operator.clone();
        match operator.ready().await?.call(OperatorRequest::GetLocations).await? {
            OperatorResponse::Locations(locations) => Ok(Response::new(proto::LocationList {
                locations: locations.into_iter().map(|location| location.into()).collect(),
            })),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }
}

/// gRPC server handler exposing a navigation client as a `NavBase` server.
///
/// The simulated base binary wraps `NavSim` with this handler.
pub struct NavBaseHandler<S> {
    nav: S,
}

impl<S> NavBaseHandler<S> {
    pub fn new(nav: S) -> Self {
        Self { nav }
    }
}

#[tonic::async_trait]
impl<S> proto::nav_base_server::NavBase for NavBaseHandler<S>
where
    S: Service<NavRequest, Response = NavResponse, Error = DeliveryError>
        + Clone
        + Sync
        + Send
        + 'static,
    S::Future: Send,
{
    async fn move_to(
        &self,
        request: Request<proto::Location>,
    ) -> Result<Response<proto::Ack>, Status> {
        let req = request.into_inner();
        let mut nav = self.nav.clone();
        match nav.ready().await?.call(NavRequest::MoveTo(req.into())).await? {
            NavResponse::Arrived => Ok(Response::new(proto::Ack {})),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }

    async fn undock(
        &self,
        _request: Request<proto::Empty>,
    ) -> Result<Response<proto::Ack>, Status> {
        let mut nav = self.nav.clone();
        match nav.ready().await?.call(NavRequest::Undock).await? {
            NavResponse::Undocked => Ok(Response::new(proto::Ack {})),
            _ => Err(Status::internal("Internal delivery API error")),
        }
    }
}

// Protocol Buffer type conversions.

impl From<Pose2D> for proto::Pose2D {
    fn from(pose: Pose2D) -> Self {
        proto::Pose2D { x: pose.x, y: pose.y, theta: pose.theta }
    }
}

impl From<proto::Pose2D> for Pose2D {
    fn from(pose: proto::Pose2D) -> Self {
        Pose2D { x: pose.x, y: pose.y, theta: pose.theta }
    }
}

impl From<Location> for proto::Location {
    fn from(location: Location) -> Self {
        proto::Location {
            unique_name: location.unique_name,
            name: location.name,
            description: location.description,
            pose: Some(location.pose.into()),
            keyframe_id: location.keyframe_id,
        }
    }
}

impl From<proto::Location> for Location {
    fn from(location: proto::Location) -> Self {
        Location {
            unique_name: location.unique_name,
            name: location.name,
            description: location.description,
            pose: location.pose.map(|pose| pose.into()).unwrap_or_default(),
            keyframe_id: location.keyframe_id,
        }
    }
}

impl From<DeliveryState> for proto::DeliveryState {
    fn from(state: DeliveryState) -> Self {
        match state {
            DeliveryState::Idle => proto::DeliveryState::Idle,
            DeliveryState::Waiting => proto::DeliveryState::Waiting,
            DeliveryState::Travelling => proto::DeliveryState::Travelling,
            DeliveryState::Invalid => proto::DeliveryState::Invalid,
        }
    }
}

impl From<DeliveryFeedback> for proto::Feedback {
    fn from(feedback: DeliveryFeedback) -> Self {
        proto::Feedback {
            goal_id: feedback.goal_id,
            state: proto::DeliveryState::from(feedback.state) as i32,
            message: feedback.message,
            traversed: feedback.traversed,
            remaining: feedback.remaining,
        }
    }
}

impl From<proto::Button> for Button {
    fn from(button: proto::Button) -> Self {
        match button {
            proto::Button::Go => Button::Go,
            proto::Button::Stop => Button::Stop,
        }
    }
}

impl From<LedPattern> for proto::LedPattern {
    fn from(pattern: LedPattern) -> Self {
        match pattern {
            LedPattern::RetainPrevious => proto::LedPattern::RetainPreviousPattern,
            LedPattern::Holding => proto::LedPattern::Holding,
            LedPattern::Error => proto::LedPattern::Error,
        }
    }
}

impl From<ButtonState> for proto::ButtonState {
    fn from(state: ButtonState) -> Self {
        match state {
            ButtonState::RetainPrevious => proto::ButtonState::RetainPreviousState,
            ButtonState::On => proto::ButtonState::On,
            ButtonState::Off => proto::ButtonState::Off,
        }
    }
}

impl From<Notification> for proto::Notification {
    fn from(notification: Notification) -> Self {
        proto::Notification {
            led_pattern: proto::LedPattern::from(notification.led_pattern) as i32,
            button_confirm: proto::ButtonState::from(notification.button_confirm) as i32,
            button_cancel: proto::ButtonState::from(notification.button_cancel) as i32,
            message: notification.message,
        }
    }
}
