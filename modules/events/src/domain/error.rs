use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Event not found: {id}")]
    EventNotFound { id: Uuid },

    #[error("Event is not active")]
    InactiveEvent,

    #[error("Already registered for this event")]
    AlreadyRegistered,

    #[error("Event is full")]
    EventFull,

    #[error("Not registered for this event")]
    NotRegistered,

    #[error("Can only give feedback after event ends")]
    EventNotEnded,

    #[error("Only registered participants can give feedback")]
    NotAParticipant,

    #[error("You have already given feedback")]
    DuplicateFeedback,

    #[error("Rating must be an integer between 1 and 5, got {value}")]
    InvalidRating { value: i32 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn event_not_found(id: Uuid) -> Self {
        Self::EventNotFound { id }
    }

    pub fn inactive_event() -> Self {
        Self::InactiveEvent
    }

    pub fn already_registered() -> Self {
        Self::AlreadyRegistered
    }

    pub fn event_full() -> Self {
        Self::EventFull
    }

    pub fn not_registered() -> Self {
        Self::NotRegistered
    }

    pub fn event_not_ended() -> Self {
        Self::EventNotEnded
    }

    pub fn not_a_participant() -> Self {
        Self::NotAParticipant
    }

    pub fn duplicate_feedback() -> Self {
        Self::DuplicateFeedback
    }

    pub fn invalid_rating(value: i32) -> Self {
        Self::InvalidRating { value }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
