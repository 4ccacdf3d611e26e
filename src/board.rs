//! The dispatch board: carrier registry plus activity store
//!
//! Owns every Carrier and Activity record, hands out sequential ids and routes
//! every status change through the transition functions on `Activity`.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::activity::{Activity, ActivityStatus, PlanRequest};
use crate::carrier::{Carrier, DestinationWindow};
use crate::clock::ClockTime;
use crate::engine::{is_overdue, CompletionEvaluation, DurationEngine};
use crate::error::{Result, StoreError, ValidationError};
use crate::utils::is_blank;

/// Narrows an activity listing; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityFilter {
    pub carrier_id: Option<u64>,
    pub status: Option<ActivityStatus>,
    pub service_date: Option<NaiveDate>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.carrier_id.map_or(true, |id| activity.carrier_id == id)
            && self.status.map_or(true, |status| activity.status() == status)
            && self
                .service_date
                .map_or(true, |date| activity.service_date == date)
    }
}

/// Reviewer totals over every recorded activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub approved: usize,
    /// Completed and not yet reviewed
    pub pending: usize,
    pub rejected: usize,
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Approved: {} | Pending: {} | Rejected: {}",
            self.approved, self.pending, self.rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    next_carrier_id: u64,
    next_activity_id: u64,
    carriers: Vec<Carrier>,
    activities: Vec<Activity>,
    pub last_updated: String, // RFC 3339 timestamp
}

impl Board {
    pub fn new() -> Self {
        Board {
            next_carrier_id: 1,
            next_activity_id: 1,
            carriers: Vec::new(),
            activities: Vec::new(),
            last_updated: Local::now().to_rfc3339(),
        }
    }

    fn touch(&mut self) {
        self.last_updated = Local::now().to_rfc3339();
    }

    /// Registers a departure and returns it
    pub fn register_carrier(
        &mut self,
        name: &str,
        departure_time: ClockTime,
        destination_window: DestinationWindow,
        today: NaiveDate,
    ) -> Result<&Carrier> {
        if is_blank(name) {
            return Err(ValidationError::MissingField("carrier name".to_string()).into());
        }

        let carrier = Carrier {
            id: self.next_carrier_id,
            name: name.trim().to_string(),
            departure_time,
            destination_window,
            registered_at: today,
        };
        self.next_carrier_id += 1;
        tracing::info!(carrier_id = carrier.id, name = %carrier.name, "Registered carrier");

        self.carriers.push(carrier);
        self.touch();
        Ok(&self.carriers[self.carriers.len() - 1])
    }

    pub fn carrier(&self, id: u64) -> Result<&Carrier> {
        self.carriers
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::CarrierNotFound(id).into())
    }

    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    /// Starts an activity against a registered carrier.
    ///
    /// The planned completion comes from the engine's profile table; unknown
    /// activity types are accepted and planned at the default rate.
    pub fn plan_activity(
        &mut self,
        engine: &DurationEngine,
        request: PlanRequest,
        today: NaiveDate,
    ) -> Result<&Activity> {
        self.carrier(request.carrier_id)?;
        if is_blank(&request.operator) {
            return Err(ValidationError::MissingField("operator".to_string()).into());
        }
        if is_blank(&request.type_name) {
            return Err(ValidationError::MissingField("activity type".to_string()).into());
        }
        if request.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(request.quantity.to_string()).into());
        }

        let planned = engine.planned_completion(
            request.start_time,
            request.type_name.trim(),
            request.quantity,
        );
        let activity = Activity::planned(self.next_activity_id, request, today, planned);
        self.next_activity_id += 1;
        tracing::info!(
            activity_id = activity.id,
            carrier_id = activity.carrier_id,
            type_name = %activity.type_name,
            start = %activity.start_time,
            planned = %activity.planned_completion_time,
            "Planned activity"
        );

        self.activities.push(activity);
        self.touch();
        Ok(&self.activities[self.activities.len() - 1])
    }

    pub fn activity(&self, id: u64) -> Result<&Activity> {
        self.activities
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::ActivityNotFound(id).into())
    }

    fn activity_mut(&mut self, id: u64) -> Result<&mut Activity> {
        self.activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::ActivityNotFound(id).into())
    }

    /// Finishes an activity at clock reading `at` taken on `today`.
    ///
    /// When `today` is later than the activity's service date the reading is
    /// moved forward by the days in between before it is compared.
    pub fn finish_activity(
        &mut self,
        id: u64,
        at: ClockTime,
        delay_reason: Option<String>,
        today: NaiveDate,
    ) -> Result<CompletionEvaluation> {
        let activity = self.activity_mut(id)?;
        let actual = on_service_day(activity, at, today);
        let evaluation = activity.finish(actual, delay_reason)?;
        tracing::info!(
            activity_id = id,
            actual = %actual,
            on_time = evaluation.on_time,
            "Finished activity"
        );
        self.touch();
        Ok(evaluation)
    }

    /// What finishing at `at` on `today` would yield, without changing anything
    pub fn preview_finish(
        &self,
        id: u64,
        at: ClockTime,
        today: NaiveDate,
    ) -> Result<CompletionEvaluation> {
        let activity = self.activity(id)?;
        Ok(activity.evaluate(on_service_day(activity, at, today)))
    }

    pub fn approve(&mut self, id: u64) -> Result<&Activity> {
        self.activity_mut(id)?.approve()?;
        tracing::info!(activity_id = id, "Approved activity");
        self.touch();
        self.activity(id)
    }

    pub fn reject(&mut self, id: u64) -> Result<&Activity> {
        self.activity_mut(id)?.reject()?;
        tracing::info!(activity_id = id, "Rejected activity");
        self.touch();
        self.activity(id)
    }

    pub fn activities(&self, filter: &ActivityFilter) -> Vec<&Activity> {
        self.activities.iter().filter(|a| filter.matches(a)).collect()
    }

    /// Unfinished activities whose planned completion has passed
    pub fn overdue(&self, now: ClockTime, today: NaiveDate) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| {
                is_overdue(
                    on_service_day(a, now, today),
                    a.planned_completion_time,
                    a.status(),
                )
            })
            .collect()
    }

    /// Completed activities waiting for approval or rejection
    pub fn review_queue(&self) -> Vec<&Activity> {
        self.activities(&ActivityFilter {
            status: Some(ActivityStatus::Completed),
            ..ActivityFilter::default()
        })
    }

    pub fn review_summary(&self) -> ReviewSummary {
        self.activities
            .iter()
            .fold(ReviewSummary::default(), |mut summary, activity| {
                match activity.status() {
                    ActivityStatus::Approved => summary.approved += 1,
                    ActivityStatus::Completed => summary.pending += 1,
                    ActivityStatus::Rejected => summary.rejected += 1,
                    ActivityStatus::Planned => {}
                }
                summary
            })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Expresses a clock reading taken on `today` relative to the activity's day.
///
/// A reading from a day before the service date clamps to its midnight.
fn on_service_day(activity: &Activity, reading: ClockTime, today: NaiveDate) -> ClockTime {
    reading.plus_days((today - activity.service_date).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoardError, TransitionError};

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
    }

    fn request(carrier_id: u64, type_name: &str, quantity: u32, start: &str) -> PlanRequest {
        PlanRequest {
            carrier_id,
            operator: "AILTON".to_string(),
            type_name: type_name.to_string(),
            quantity,
            start_time: t(start),
        }
    }

    fn board_with_carrier() -> (Board, DurationEngine) {
        let mut board = Board::new();
        board
            .register_carrier("SULAMERICANO", t("15:01"), DestinationWindow::Today, day())
            .unwrap();
        (board, DurationEngine::default())
    }

    #[test]
    fn test_register_carrier_assigns_sequential_ids() {
        let mut board = Board::new();
        let first = board
            .register_carrier(" LOVATO ", t("15:00"), DestinationWindow::Today, day())
            .unwrap()
            .id;
        let second = board
            .register_carrier("TRANSVOAR", t("12:10"), DestinationWindow::Tomorrow, day())
            .unwrap()
            .id;
        assert_eq!((first, second), (1, 2));
        assert_eq!(board.carrier(1).unwrap().name, "LOVATO");
        assert_eq!(board.carriers().len(), 2);
    }

    #[test]
    fn test_register_carrier_requires_name() {
        let mut board = Board::new();
        let err = board
            .register_carrier("  ", t("15:00"), DestinationWindow::Today, day())
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(ValidationError::MissingField(_))));
    }

    #[test]
    fn test_plan_activity_computes_planned_completion() {
        let (mut board, engine) = board_with_carrier();
        let activity = board
            .plan_activity(&engine, request(1, "Carregamento - Fracionado", 16, "10:50"), day())
            .unwrap();
        assert_eq!(activity.id, 1);
        assert_eq!(activity.planned_completion_time, t("11:22"));
        assert_eq!(activity.status(), ActivityStatus::Planned);
        assert_eq!(activity.service_date, day());
    }

    #[test]
    fn test_plan_activity_validation() {
        let (mut board, engine) = board_with_carrier();

        let err = board
            .plan_activity(&engine, request(9, "Manifesto", 1, "10:15"), day())
            .unwrap_err();
        assert!(matches!(err, BoardError::Store(StoreError::CarrierNotFound(9))));

        let err = board
            .plan_activity(&engine, request(1, "Manifesto", 0, "10:15"), day())
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(ValidationError::InvalidQuantity(_))));

        let mut blank_operator = request(1, "Manifesto", 1, "10:15");
        blank_operator.operator = " ".to_string();
        let err = board.plan_activity(&engine, blank_operator, day()).unwrap_err();
        assert!(matches!(err, BoardError::Validation(ValidationError::MissingField(_))));

        assert!(board.activities(&ActivityFilter::default()).is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let (mut board, engine) = board_with_carrier();
        let id = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "10:15"), day())
            .unwrap()
            .id;

        assert!(board.review_queue().is_empty());
        let evaluation = board.finish_activity(id, t("10:15"), None, day()).unwrap();
        assert!(evaluation.on_time);
        assert_eq!(board.review_queue().len(), 1);

        let approved = board.approve(id).unwrap();
        assert_eq!(approved.status(), ActivityStatus::Approved);
        assert!(board.review_queue().is_empty());

        let err = board.reject(id).unwrap_err();
        assert!(matches!(
            err,
            BoardError::Transition(TransitionError::CannotReview { .. })
        ));
    }

    #[test]
    fn test_approve_planned_activity_is_rejected() {
        let (mut board, engine) = board_with_carrier();
        let id = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "10:15"), day())
            .unwrap()
            .id;
        assert!(board.approve(id).is_err());
        assert!(board.reject(id).is_err());
        assert!(matches!(
            board.approve(42).unwrap_err(),
            BoardError::Store(StoreError::ActivityNotFound(42))
        ));
    }

    #[test]
    fn test_overdue() {
        let (mut board, engine) = board_with_carrier();
        let late = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "10:15"), day())
            .unwrap()
            .id;
        let running = board
            .plan_activity(&engine, request(1, "Invetário dos corredores", 1, "10:00"), day())
            .unwrap()
            .id;
        let done = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "09:00"), day())
            .unwrap()
            .id;
        board.finish_activity(done, t("09:01"), None, day()).unwrap();

        let overdue: Vec<u64> = board.overdue(t("10:20"), day()).iter().map(|a| a.id).collect();
        assert_eq!(overdue, vec![late]);

        let overdue: Vec<u64> = board.overdue(t("10:16"), day()).iter().map(|a| a.id).collect();
        assert!(overdue.is_empty());

        // the next morning both unfinished activities are overdue
        let tomorrow = day().succ_opt().unwrap();
        let overdue: Vec<u64> = board.overdue(t("06:00"), tomorrow).iter().map(|a| a.id).collect();
        assert_eq!(overdue, vec![late, running]);
    }

    #[test]
    fn test_finish_on_a_later_day_counts_as_late() {
        let (mut board, engine) = board_with_carrier();
        let id = board
            .plan_activity(&engine, request(1, "Carregamento - Fracionado", 16, "10:50"), day())
            .unwrap()
            .id;
        let tomorrow = day().succ_opt().unwrap();

        let preview = board.preview_finish(id, t("08:00"), tomorrow).unwrap();
        assert!(!preview.on_time);

        board
            .finish_activity(id, t("08:00"), Some("truck arrived late".to_string()), tomorrow)
            .unwrap();
        let activity = board.activity(id).unwrap();
        assert_eq!(activity.actual_completion_time, Some(t("08:00+1")));
        assert_eq!(activity.on_time, Some(false));
    }

    #[test]
    fn test_overdue_ignores_activities_planned_for_a_later_day() {
        let (mut board, engine) = board_with_carrier();
        let tomorrow = day().succ_opt().unwrap();
        let id = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "10:15"), tomorrow)
            .unwrap()
            .id;

        assert!(board.overdue(t("10:20"), day()).is_empty());
        assert!(board.overdue(t("23:59"), day()).is_empty());
        let overdue: Vec<u64> = board.overdue(t("10:20"), tomorrow).iter().map(|a| a.id).collect();
        assert_eq!(overdue, vec![id]);
    }

    #[test]
    fn test_finish_on_a_day_before_the_service_date_is_rejected() {
        let (mut board, engine) = board_with_carrier();
        let tomorrow = day().succ_opt().unwrap();
        let id = board
            .plan_activity(&engine, request(1, "Manifesto", 1, "10:15"), tomorrow)
            .unwrap()
            .id;

        let preview = board.preview_finish(id, t("10:20"), day()).unwrap();
        assert!(preview.on_time);

        let err = board.finish_activity(id, t("10:20"), None, day()).unwrap_err();
        assert!(matches!(
            err,
            BoardError::Validation(ValidationError::CompletionBeforeStart { .. })
        ));
        let activity = board.activity(id).unwrap();
        assert_eq!(activity.status(), ActivityStatus::Planned);
        assert_eq!(activity.actual_completion_time, None);
    }

    #[test]
    fn test_review_summary() {
        let (mut board, engine) = board_with_carrier();
        for start in ["08:00", "09:00", "10:00", "11:00"] {
            board
                .plan_activity(&engine, request(1, "Manifesto", 1, start), day())
                .unwrap();
        }
        for (id, at) in [(1, "08:01"), (2, "09:01"), (3, "10:01")] {
            board.finish_activity(id, t(at), None, day()).unwrap();
        }
        board.approve(1).unwrap();
        board.reject(2).unwrap();

        let summary = board.review_summary();
        assert_eq!(
            summary,
            ReviewSummary {
                approved: 1,
                pending: 1,
                rejected: 1
            }
        );
        assert_eq!(summary.to_string(), "Approved: 1 | Pending: 1 | Rejected: 1");
        assert_eq!(Board::new().review_summary(), ReviewSummary::default());
    }

    #[test]
    fn test_activity_filter() {
        let mut board = Board::new();
        let engine = DurationEngine::default();
        board
            .register_carrier("A", t("15:00"), DestinationWindow::Today, day())
            .unwrap();
        board
            .register_carrier("B", t("16:00"), DestinationWindow::ThreeDays, day())
            .unwrap();
        board
            .plan_activity(&engine, request(1, "Picking - Cons", 2, "08:00"), day())
            .unwrap();
        board
            .plan_activity(&engine, request(2, "Picking - Cons", 2, "08:00"), day())
            .unwrap();
        board.finish_activity(2, t("08:03"), None, day()).unwrap();

        let for_b = board.activities(&ActivityFilter {
            carrier_id: Some(2),
            ..ActivityFilter::default()
        });
        assert_eq!(for_b.len(), 1);

        let planned = board.activities(&ActivityFilter {
            status: Some(ActivityStatus::Planned),
            ..ActivityFilter::default()
        });
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].carrier_id, 1);

        let other_day = board.activities(&ActivityFilter {
            service_date: NaiveDate::from_ymd_opt(2025, 7, 15),
            ..ActivityFilter::default()
        });
        assert!(other_day.is_empty());
    }
}
