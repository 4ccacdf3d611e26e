//! Carrier dispatch board
//!
//! Planners register carrier departures and start timed activities against
//! them. The duration engine projects each activity's planned completion from
//! a per-type profile table and classifies finished work as on time or late;
//! reviewers then approve or reject completed activities.

pub mod activity;
pub mod board;
pub mod carrier;
pub mod clock;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod logging;
pub mod profiles;
pub mod store;
pub mod utils;

pub use activity::{Activity, ActivityStatus, PlanRequest};
pub use board::{ActivityFilter, Board, ReviewSummary};
pub use carrier::{Carrier, DestinationWindow};
pub use clock::ClockTime;
pub use engine::{elapsed_minutes, evaluate_completion, is_overdue, CompletionEvaluation, DurationEngine};
pub use error::{BoardError, Result};
pub use profiles::{ActivityTypeProfile, ProfileTable, QuantityUnit};
