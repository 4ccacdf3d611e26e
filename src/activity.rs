//! Activities and their status lifecycle

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::ClockTime;
use crate::engine::{evaluate_completion, CompletionEvaluation};
use crate::error::{BoardError, TransitionError, ValidationError};
use crate::utils::is_blank;

/// Where an activity is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Planned,
    Completed,
    Approved,
    Rejected,
}

impl ActivityStatus {
    /// Completed or any state after it
    pub fn is_finalized(&self) -> bool {
        !matches!(self, ActivityStatus::Planned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Planned => "planned",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Approved => "approved",
            ActivityStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" | "planejado" => Ok(ActivityStatus::Planned),
            "completed" | "concluido" | "concluído" => Ok(ActivityStatus::Completed),
            "approved" | "aprovado" => Ok(ActivityStatus::Approved),
            "rejected" | "rejeitado" => Ok(ActivityStatus::Rejected),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// What the planner supplies when starting an activity
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub carrier_id: u64,
    pub operator: String,
    pub type_name: String,
    pub quantity: u32,
    pub start_time: ClockTime,
}

/// One tracked unit of work against a carrier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub carrier_id: u64,
    pub operator: String,
    pub type_name: String,
    pub quantity: u32,
    /// Day the clock readings below are measured from
    pub service_date: NaiveDate,
    pub start_time: ClockTime,
    pub planned_completion_time: ClockTime,
    #[serde(default)]
    pub actual_completion_time: Option<ClockTime>,
    #[serde(default)]
    pub delay_reason: Option<String>,
    #[serde(default)]
    pub on_time: Option<bool>,
    status: ActivityStatus,
}

impl Activity {
    /// A freshly planned activity
    pub fn planned(
        id: u64,
        request: PlanRequest,
        service_date: NaiveDate,
        planned_completion_time: ClockTime,
    ) -> Self {
        Self {
            id,
            carrier_id: request.carrier_id,
            operator: request.operator.trim().to_string(),
            type_name: request.type_name.trim().to_string(),
            quantity: request.quantity,
            service_date,
            start_time: request.start_time,
            planned_completion_time,
            actual_completion_time: None,
            delay_reason: None,
            on_time: None,
            status: ActivityStatus::Planned,
        }
    }

    pub fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Classifies `actual` against the plan without changing anything
    pub fn evaluate(&self, actual: ClockTime) -> CompletionEvaluation {
        evaluate_completion(Some(self.start_time), self.planned_completion_time, actual)
    }

    /// planned -> completed.
    ///
    /// A late finish needs a non-blank delay reason. An on-time finish keeps
    /// a reason if one is given.
    pub fn finish(
        &mut self,
        actual: ClockTime,
        delay_reason: Option<String>,
    ) -> Result<CompletionEvaluation, BoardError> {
        if self.status != ActivityStatus::Planned {
            return Err(TransitionError::CannotFinish {
                id: self.id,
                status: self.status,
            }
            .into());
        }
        if actual < self.start_time {
            return Err(ValidationError::CompletionBeforeStart {
                start: self.start_time.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }

        let evaluation = self.evaluate(actual);
        let reason = delay_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !is_blank(r));
        if !evaluation.on_time && reason.is_none() {
            return Err(ValidationError::MissingDelayReason {
                minutes_late: evaluation.minutes_late,
            }
            .into());
        }

        self.actual_completion_time = Some(actual);
        self.on_time = Some(evaluation.on_time);
        self.delay_reason = reason;
        self.status = ActivityStatus::Completed;
        Ok(evaluation)
    }

    /// completed -> approved
    pub fn approve(&mut self) -> Result<(), TransitionError> {
        self.review(ActivityStatus::Approved)
    }

    /// completed -> rejected
    pub fn reject(&mut self) -> Result<(), TransitionError> {
        self.review(ActivityStatus::Rejected)
    }

    fn review(&mut self, verdict: ActivityStatus) -> Result<(), TransitionError> {
        if self.status != ActivityStatus::Completed {
            return Err(TransitionError::CannotReview {
                id: self.id,
                status: self.status,
            });
        }
        self.status = verdict;
        Ok(())
    }
}
