//! Carrier departures registered on the board

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::ClockTime;
use crate::error::ValidationError;

/// When the load is due at its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestinationWindow {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "tomorrow")]
    Tomorrow,
    #[serde(rename = "3 days")]
    ThreeDays,
}

impl DestinationWindow {
    pub fn label(&self) -> &'static str {
        match self {
            DestinationWindow::Today => "today",
            DestinationWindow::Tomorrow => "tomorrow",
            DestinationWindow::ThreeDays => "3 days",
        }
    }
}

impl fmt::Display for DestinationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DestinationWindow {
    type Err = ValidationError;

    /// Accepts the English labels and the floor's HOJE / AMANHÃ / 3 DIAS
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect();
        match normalized.as_str() {
            "today" | "hoje" => Ok(DestinationWindow::Today),
            "tomorrow" | "amanhã" | "amanha" => Ok(DestinationWindow::Tomorrow),
            "3days" | "3dias" | "threedays" => Ok(DestinationWindow::ThreeDays),
            _ => Err(ValidationError::UnknownDestinationWindow(s.to_string())),
        }
    }
}

/// A registered outbound departure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub id: u64,
    pub name: String,
    pub departure_time: ClockTime,
    pub destination_window: DestinationWindow,
    pub registered_at: NaiveDate,
}
