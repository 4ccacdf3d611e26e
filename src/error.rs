//! Custom error types for the dispatch board
//!
//! Structured errors built with thiserror. The engine itself never fails;
//! everything here is raised by input validation, the board's state machine,
//! the local snapshot or the configuration layer.

use thiserror::Error;

use crate::activity::ActivityStatus;

/// Main error type for the dispatch board
#[derive(Error, Debug)]
pub enum BoardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid status transitions
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// Snapshot and lookup errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Date/time parsing errors
    #[error("Date/time error: {0}")]
    DateTime(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the {0} directory")]
    DirectoryUnavailable(&'static str),

    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration file: {0}")]
    SaveFailed(String),

    #[error("Failed to load activity profiles: {0}")]
    ProfilesLoadFailed(String),

    #[error("Activity type '{0}' is defined more than once")]
    DuplicateProfile(String),

    #[error("Invalid profile for '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid time: {0}. Expected HH:MM, HH:MM:SS or HH:MM+N")]
    InvalidClockTime(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD, YYYY.MM.DD, or YYYY/MM/DD")]
    InvalidDateFormat(String),

    #[error("Invalid quantity: {0}. Must be a whole number, greater than zero when planning")]
    InvalidQuantity(String),

    #[error("Unknown destination window: {0}. Expected today, tomorrow or 3 days")]
    UnknownDestinationWindow(String),

    #[error("Unknown activity status: {0}")]
    UnknownStatus(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Activity finished {minutes_late:.1} min after its planned completion; a delay reason is required")]
    MissingDelayReason { minutes_late: f64 },

    #[error("Completion time {actual} is earlier than the start time {start}")]
    CompletionBeforeStart { start: String, actual: String },

    #[error("Elapsed time is not computable: {0} is missing")]
    ElapsedNotComputable(&'static str),
}

/// Invalid activity status transitions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Activity {id} cannot be finished: it is already {status}")]
    CannotFinish { id: u64, status: ActivityStatus },

    #[error("Activity {id} cannot be reviewed: it is {status}, expected completed")]
    CannotReview { id: u64, status: ActivityStatus },
}

/// Board lookup and snapshot errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Carrier not found: {0}")]
    CarrierNotFound(u64),

    #[error("Activity not found: {0}")]
    ActivityNotFound(u64),

    #[error("Failed to read board snapshot: {0}")]
    LoadFailed(String),

    #[error("Failed to write board snapshot: {0}")]
    SaveFailed(String),
}

/// Result type alias for the dispatch board
pub type Result<T> = std::result::Result<T, BoardError>;

impl From<chrono::ParseError> for BoardError {
    fn from(err: chrono::ParseError) -> Self {
        BoardError::DateTime(err.to_string())
    }
}
