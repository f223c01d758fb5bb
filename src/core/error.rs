use thiserror::Error;

use crate::core::types::{AlertId, MissionId, ObserverId, PieceId, RequestId, UnitId, UserId};

#[derive(Error, Debug)]
pub enum FirelineError {
    #[error("Unit not found: {0:?}")]
    UnitNotFound(UnitId),

    #[error("Artillery piece not found: {0:?}")]
    PieceNotFound(PieceId),

    #[error("Forward observer not found: {0:?}")]
    ObserverNotFound(ObserverId),

    #[error("Fire mission not found: {0:?}")]
    MissionNotFound(MissionId),

    #[error("Alert not found: {0:?}")]
    AlertNotFound(AlertId),

    #[error("Logistics request not found: {0:?}")]
    RequestNotFound(RequestId),

    #[error("User not found: {0:?}")]
    UserNotFound(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Illegal transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Notification error: {0}")]
    NotifyError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FirelineError>;
