//! Activity duration and lateness engine
//!
//! Pure computation over the profile table and clock readings: planned
//! duration, planned completion, on-time classification, elapsed time and the
//! overdue query. Nothing here performs I/O or mutates shared state, so one
//! engine can be shared freely between callers.

use crate::activity::ActivityStatus;
use crate::clock::ClockTime;
use crate::error::ValidationError;
use crate::profiles::{ActivityTypeProfile, ProfileTable};

/// Outcome of comparing an actual completion against the plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvaluation {
    /// `actual <= planned`; finishing exactly on the planned minute is on time
    pub on_time: bool,
    /// Minutes from start to actual completion, when the start is known
    pub elapsed_minutes: Option<f64>,
    /// Minutes past the planned completion (zero or negative when on time)
    pub minutes_late: f64,
}

/// Duration and lateness calculations over an injected profile table
#[derive(Debug, Clone, Default)]
pub struct DurationEngine {
    profiles: ProfileTable,
}

impl DurationEngine {
    pub fn new(profiles: ProfileTable) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// The profile for `type_name`, falling back to 1 minute per unit
    pub fn resolve_profile(&self, type_name: &str) -> &ActivityTypeProfile {
        match self.profiles.get(type_name) {
            Some(profile) => profile,
            None => {
                tracing::warn!(
                    type_name,
                    "Unknown activity type, using the default of 1 minute per unit"
                );
                ActivityTypeProfile::default_profile()
            }
        }
    }

    /// Planned duration in minutes. Fixed-duration types ignore `quantity`.
    pub fn planned_duration(&self, type_name: &str, quantity: u32) -> f64 {
        let profile = self.resolve_profile(type_name);
        let minutes = if profile.is_fixed_duration {
            profile.unit_duration_minutes
        } else {
            profile.unit_duration_minutes * f64::from(quantity)
        };
        tracing::debug!(type_name, quantity, minutes, "Computed planned duration");
        minutes
    }

    /// `start` plus the planned duration. Past midnight the result carries a
    /// day offset rather than wrapping.
    pub fn planned_completion(&self, start: ClockTime, type_name: &str, quantity: u32) -> ClockTime {
        start.add_minutes(self.planned_duration(type_name, quantity))
    }
}

/// Classifies an actual completion against the planned one
pub fn evaluate_completion(
    start: Option<ClockTime>,
    planned: ClockTime,
    actual: ClockTime,
) -> CompletionEvaluation {
    CompletionEvaluation {
        on_time: actual <= planned,
        elapsed_minutes: start.map(|start| actual.minutes_since(start)),
        minutes_late: actual.minutes_since(planned),
    }
}

/// Minutes from start to actual completion.
///
/// Both bounds must be present; an incomplete record is reported instead of
/// producing a number.
pub fn elapsed_minutes(
    start: Option<ClockTime>,
    actual: Option<ClockTime>,
) -> Result<f64, ValidationError> {
    let start = start.ok_or(ValidationError::ElapsedNotComputable("start time"))?;
    let actual = actual.ok_or(ValidationError::ElapsedNotComputable("actual completion time"))?;
    Ok(actual.minutes_since(start))
}

/// Whether unfinished work has run past its planned completion
pub fn is_overdue(now: ClockTime, planned: ClockTime, status: ActivityStatus) -> bool {
    if status.is_finalized() {
        return false;
    }
    now > planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::ActivityTypeProfile;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    fn engine() -> DurationEngine {
        DurationEngine::new(ProfileTable::builtin())
    }

    #[test]
    fn test_per_unit_duration_scales_with_quantity() {
        let engine = engine();
        for quantity in [0, 1, 13, 16, 250] {
            assert_eq!(
                engine.planned_duration("Carregamento - Fracionado", quantity),
                2.0 * f64::from(quantity)
            );
        }
        assert_eq!(engine.planned_duration("Picking - Área de Saída", 7), 3.5);
    }

    #[test]
    fn test_fixed_duration_ignores_quantity() {
        let engine = engine();
        let fixed: Vec<String> = engine
            .profiles()
            .iter()
            .filter(|p| p.is_fixed_duration)
            .map(|p| p.type_name.clone())
            .collect();
        assert!(!fixed.is_empty());

        for type_name in &fixed {
            let baseline = engine.planned_duration(type_name, 0);
            for quantity in [1, 2, 999] {
                assert_eq!(engine.planned_duration(type_name, quantity), baseline);
            }
        }
        assert_eq!(engine.planned_duration("Invetário dos corredores", 999), 45.0);
    }

    #[test]
    fn test_unknown_type_uses_default_profile() {
        let engine = engine();
        assert_eq!(engine.planned_duration("Manifesto", 1), 1.0);
        assert_eq!(engine.planned_duration("Manifesto", 12), 12.0);
        assert_eq!(engine.planned_duration("", 3), 3.0);
    }

    #[test]
    fn test_planned_completion_scenarios() {
        let engine = engine();
        assert_eq!(
            engine.planned_completion(t("10:50"), "Carregamento - Fracionado", 16),
            t("11:22")
        );
        assert_eq!(engine.planned_completion(t("10:15"), "Manifesto", 1), t("10:16"));
        assert_eq!(
            engine.planned_completion(t("10:31"), "Carregamento - Transferência", 13),
            t("10:57")
        );
    }

    #[test]
    fn test_planned_completion_is_start_plus_duration() {
        let engine = engine();
        for start in ["00:00", "06:45", "13:07", "22:59"] {
            let start = t(start);
            for profile in engine.profiles().iter() {
                let duration = engine.planned_duration(&profile.type_name, 9);
                assert_eq!(
                    engine.planned_completion(start, &profile.type_name, 9),
                    start.add_minutes(duration)
                );
            }
        }
    }

    #[test]
    fn test_planned_completion_crosses_midnight() {
        let engine = engine();
        let completion = engine.planned_completion(t("23:40"), "Invetário dos corredores", 1);
        assert_eq!(completion.to_string(), "00:25+1");
        assert!(completion > t("23:40"));
    }

    #[test]
    fn test_fractional_minutes_are_not_rounded_away() {
        let engine = DurationEngine::new(
            ProfileTable::from_profiles(vec![ActivityTypeProfile::per_unit("Etiquetagem", 1.25)])
                .unwrap(),
        );
        assert_eq!(engine.planned_duration("Etiquetagem", 15), 18.75);
        assert_eq!(
            engine.planned_completion(t("10:49"), "Etiquetagem", 15),
            t("11:07:45")
        );
    }

    #[test]
    fn test_on_time_boundaries() {
        let equal = evaluate_completion(Some(t("10:50")), t("11:22"), t("11:22"));
        assert!(equal.on_time);
        assert_eq!(equal.minutes_late, 0.0);

        let early = evaluate_completion(Some(t("10:49")), t("11:08"), t("11:06"));
        assert!(early.on_time);
        assert_eq!(early.elapsed_minutes, Some(17.0));

        let before = evaluate_completion(Some(t("10:50")), t("11:22"), t("11:14"));
        assert!(before.on_time);
        assert_eq!(before.elapsed_minutes, Some(24.0));

        let late = evaluate_completion(Some(t("10:50")), t("11:22"), t("11:30"));
        assert!(!late.on_time);
        assert_eq!(late.minutes_late, 8.0);

        let barely = evaluate_completion(None, t("11:22"), t("11:22:00.001"));
        assert!(!barely.on_time);
        assert_eq!(barely.elapsed_minutes, None);
    }

    #[test]
    fn test_elapsed_requires_both_bounds() {
        assert_eq!(elapsed_minutes(Some(t("10:14")), Some(t("10:15"))), Ok(1.0));
        assert_eq!(
            elapsed_minutes(None, Some(t("10:15"))),
            Err(ValidationError::ElapsedNotComputable("start time"))
        );
        assert_eq!(
            elapsed_minutes(Some(t("10:15")), None),
            Err(ValidationError::ElapsedNotComputable("actual completion time"))
        );
    }

    #[test]
    fn test_is_overdue() {
        assert!(is_overdue(t("10:20"), t("10:16"), ActivityStatus::Planned));
        assert!(!is_overdue(t("10:16"), t("10:16"), ActivityStatus::Planned));
        assert!(!is_overdue(t("10:10"), t("10:16"), ActivityStatus::Planned));

        for status in [
            ActivityStatus::Completed,
            ActivityStatus::Approved,
            ActivityStatus::Rejected,
        ] {
            assert!(!is_overdue(t("23:59+3"), t("10:16"), status));
        }
    }
}
