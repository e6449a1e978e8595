use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    #[error("delivery error, internal delivery API error")]
    InternalDeliveryError,

    #[error("delivery error, goal empty, nothing to do")]
    EmptyGoal,

    #[error("delivery error, busy, already assigned a goal")]
    AlreadyAssignedGoal,

    #[error("delivery error, unknown location '{0}'")]
    UnknownLocation(String),

    #[error("delivery error, semantic map has no homebase entry")]
    MissingHomebase,

    #[error("delivery error, invalid semantic map ({0})")]
    InvalidSemanticMap(String),

    #[error("delivery error, navigation failed toward '{0}'")]
    NavigationFailed(String),

    #[error("delivery error, failed to contact navigation base ({0})")]
    TransportFailedToContactBase(String),
}
