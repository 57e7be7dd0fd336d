//! Error types for the notification service

use thiserror::Error;

use super::model::UserId;

/// Errors surfaced by collaborators and the coordinator
#[derive(Error, Debug)]
pub enum WatchError {
    /// The event source could not produce the active event list
    #[error("Failed to fetch active events: {0}")]
    EventFetch(String),

    /// No user record for this id
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The delivery collaborator rejected a notification
    #[error("Failed to deliver notification for event {event_id}: {reason}")]
    Delivery { event_id: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WatchError>;
