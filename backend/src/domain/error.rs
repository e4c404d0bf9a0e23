//! Typed errors raised by the domain layer.
//!
//! Services return `anyhow::Result`; these variants travel inside the
//! `anyhow::Error` so the REST layer can downcast and pick a status code.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("Unknown mood label: {0}")]
    UnknownMoodLabel(String),
    #[error("Assistant unavailable: {0}")]
    AssistantUnavailable(String),
    #[error("No user is signed in")]
    NotSignedIn,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("Either an LMP date or a due date is required")]
    MissingAnchor,
    #[error("Provide only one of LMP date and due date")]
    ConflictingAnchors,
    #[error("Display name cannot be empty")]
    EmptyDisplayName,
    #[error("Display name cannot exceed 100 characters")]
    DisplayNameTooLong,
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Days must be between {min} and {max}")]
    DaysOutOfRange { min: i64, max: i64 },
}
