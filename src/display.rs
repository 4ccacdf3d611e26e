//! Plain-text tables for the terminal

use crate::activity::{Activity, ActivityStatus};
use crate::board::Board;
use crate::carrier::Carrier;
use crate::engine::elapsed_minutes;
use crate::profiles::ProfileTable;
use crate::utils::{format_minutes, pad_column};

fn quantity_text(profiles: &ProfileTable, activity: &Activity) -> String {
    let unit = profiles
        .get(&activity.type_name)
        .map(|p| p.unit)
        .unwrap_or_default();
    format!("{} {}", activity.quantity, unit.label(activity.quantity))
}

fn status_text(activity: &Activity) -> String {
    match (activity.status(), activity.on_time) {
        (ActivityStatus::Planned, _) => "planned".to_string(),
        (status, Some(true)) => format!("{} (on time)", status),
        (status, Some(false)) => format!("{} (late)", status),
        (status, None) => status.to_string(),
    }
}

pub fn render_carriers(carriers: &[Carrier]) -> String {
    if carriers.is_empty() {
        return "No carriers registered".to_string();
    }

    let mut out = format!(
        "{} {} {} {} {}\n",
        pad_column("ID", 5),
        pad_column("Carrier", 28),
        pad_column("Departure", 10),
        pad_column("Load for", 10),
        "Registered"
    );
    out.push_str(&"-".repeat(68));
    out.push('\n');

    for carrier in carriers {
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            pad_column(&carrier.id.to_string(), 5),
            pad_column(&carrier.name, 28),
            pad_column(&carrier.departure_time.to_string(), 10),
            pad_column(carrier.destination_window.label(), 10),
            carrier.registered_at.format("%Y-%m-%d")
        ));
    }
    out
}

pub fn render_activities(board: &Board, profiles: &ProfileTable, activities: &[&Activity]) -> String {
    if activities.is_empty() {
        return "No activities found".to_string();
    }

    let mut out = format!(
        "{} {} {} {} {} {} {} {} {} {}\n",
        pad_column("ID", 5),
        pad_column("Carrier", 16),
        pad_column("Operator", 14),
        pad_column("Activity", 30),
        pad_column("Qty", 11),
        pad_column("Start", 8),
        pad_column("Planned", 8),
        pad_column("Actual", 8),
        pad_column("Time", 9),
        "Status"
    );
    out.push_str(&"-".repeat(140));
    out.push('\n');

    for activity in activities {
        let carrier = board
            .carrier(activity.carrier_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let actual = activity
            .actual_completion_time
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let elapsed = elapsed_minutes(Some(activity.start_time), activity.actual_completion_time)
            .map(format_minutes)
            .unwrap_or_else(|_| "-".to_string());

        out.push_str(&format!(
            "{} {} {} {} {} {} {} {} {} {}\n",
            pad_column(&activity.id.to_string(), 5),
            pad_column(carrier, 16),
            pad_column(&activity.operator, 14),
            pad_column(&activity.type_name, 30),
            pad_column(&quantity_text(profiles, activity), 11),
            pad_column(&activity.start_time.to_string(), 8),
            pad_column(&activity.planned_completion_time.to_string(), 8),
            pad_column(&actual, 8),
            pad_column(&elapsed, 9),
            status_text(activity)
        ));
        if let Some(reason) = &activity.delay_reason {
            out.push_str(&format!("{}  reason: {}\n", " ".repeat(5), reason));
        }
    }
    out
}

pub fn render_profiles(profiles: &ProfileTable) -> String {
    let mut out = format!(
        "{} {} {}\n",
        pad_column("Activity type", 40),
        pad_column("Duration", 18),
        "Counts"
    );
    out.push_str(&"-".repeat(66));
    out.push('\n');

    for profile in profiles.iter() {
        let duration = if profile.is_fixed_duration {
            format!("{} fixed", format_minutes(profile.unit_duration_minutes))
        } else {
            format!("{} each", format_minutes(profile.unit_duration_minutes))
        };
        out.push_str(&format!(
            "{} {} {}\n",
            pad_column(&profile.type_name, 40),
            pad_column(&duration, 18),
            profile.unit
        ));
    }
    out.push_str("Any other type: 1 min each\n");
    out
}
