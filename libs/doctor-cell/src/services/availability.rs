// libs/doctor-cell/src/services/availability.rs
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::models::DoctorSchedule;

pub const NO_SLOTS_MESSAGE: &str = "No available slots for this date";

/// Outcome of resolving a doctor's schedule against a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotResolution {
    pub available_slots: Vec<String>,
    pub message: Option<String>,
}

impl SlotResolution {
    fn empty() -> Self {
        Self {
            available_slots: Vec::new(),
            message: Some(NO_SLOTS_MESSAGE.to_string()),
        }
    }
}

/// Walk the day's availability window in granularity steps and produce the
/// full candidate grid, formatted `HH:MM`, before any claim or clock
/// filtering. A misconfigured window (end before start, zero granularity)
/// produces an empty grid rather than an error; schedule quality is enforced
/// upstream in profile management.
pub fn candidate_slots(schedule: &DoctorSchedule, date: NaiveDate) -> Vec<String> {
    let rule = match schedule.rule_for(date) {
        Some(rule) if rule.is_available => rule,
        _ => return Vec::new(),
    };

    let granularity = schedule.slot_granularity_minutes;
    if granularity == 0 {
        return Vec::new();
    }

    // Walk in minutes since midnight; `NaiveTime` addition wraps at
    // midnight, which would never terminate for windows ending near 24:00.
    let start = rule.start_time.num_seconds_from_midnight() / 60;
    let end = rule.end_time.num_seconds_from_midnight() / 60;

    let mut slots = Vec::new();
    let mut current = start;
    while current + granularity <= end {
        slots.push(format!("{:02}:{:02}", current / 60, current % 60));
        current += granularity;
    }
    slots
}

/// Resolve the bookable slots for `(schedule, date)`.
///
/// Pure function of its inputs: the candidate grid minus already-claimed
/// slots, minus slots whose start time has already passed when `date` is
/// today. `now` is the clinic's local wall clock, threaded in by the caller.
pub fn resolve_slots(
    schedule: &DoctorSchedule,
    date: NaiveDate,
    existing_claims: &HashSet<String>,
    now: NaiveDateTime,
) -> SlotResolution {
    let candidates = candidate_slots(schedule, date);
    if candidates.is_empty() {
        debug!("No candidate slots for doctor {} on {}", schedule.doctor_id, date);
        return SlotResolution::empty();
    }

    let today = now.date();
    let cutoff = now.time().format("%H:%M").to_string();

    let available_slots: Vec<String> = candidates
        .into_iter()
        .filter(|slot| !existing_claims.contains(slot))
        .filter(|slot| date != today || slot.as_str() > cutoff.as_str())
        .collect();

    if available_slots.is_empty() {
        return SlotResolution::empty();
    }

    SlotResolution {
        available_slots,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRule;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn schedule(start: (u32, u32), end: (u32, u32), granularity: u32) -> DoctorSchedule {
        let day_rules = (0..7)
            .map(|day| DayRule {
                day_of_week: day,
                start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
                is_available: day != 0, // closed on Sundays
            })
            .collect();
        DoctorSchedule {
            doctor_id: Uuid::new_v4(),
            day_rules,
            consultation_fee: 50.0,
            emergency_available: false,
            slot_granularity_minutes: granularity,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn far_in_the_past() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn generates_half_hour_grid_for_morning_window() {
        let resolution = resolve_slots(
            &schedule((9, 0), (12, 0), 30),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert_eq!(
            resolution.available_slots,
            vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
        );
        assert!(resolution.message.is_none());
    }

    #[test]
    fn unavailable_day_yields_message() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let resolution = resolve_slots(
            &schedule((9, 0), (12, 0), 30),
            sunday,
            &HashSet::new(),
            far_in_the_past(),
        );
        assert!(resolution.available_slots.is_empty());
        assert_eq!(resolution.message.as_deref(), Some(NO_SLOTS_MESSAGE));
    }

    #[test]
    fn claimed_slots_are_removed() {
        let claims: HashSet<String> = ["09:30".to_string(), "11:00".to_string()].into();
        let resolution = resolve_slots(
            &schedule((9, 0), (12, 0), 30),
            monday(),
            &claims,
            far_in_the_past(),
        );
        assert_eq!(resolution.available_slots, vec!["09:00", "10:00", "10:30", "11:30"]);
    }

    #[test]
    fn same_day_resolution_drops_passed_slots() {
        let now = monday().and_hms_opt(10, 15, 0).unwrap();
        let resolution = resolve_slots(&schedule((9, 0), (12, 0), 30), monday(), &HashSet::new(), now);
        assert_eq!(resolution.available_slots, vec!["10:30", "11:00", "11:30"]);
    }

    #[test]
    fn slot_starting_exactly_now_counts_as_passed() {
        let now = monday().and_hms_opt(10, 0, 0).unwrap();
        let resolution = resolve_slots(&schedule((9, 0), (12, 0), 30), monday(), &HashSet::new(), now);
        assert_eq!(resolution.available_slots, vec!["10:30", "11:00", "11:30"]);
    }

    #[test]
    fn end_before_start_is_empty_not_an_error() {
        let resolution = resolve_slots(
            &schedule((12, 0), (9, 0), 30),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert!(resolution.available_slots.is_empty());
        assert_eq!(resolution.message.as_deref(), Some(NO_SLOTS_MESSAGE));
    }

    #[test]
    fn ragged_tail_is_truncated() {
        // 09:00-10:45 with 30-minute slots: 10:30 would overrun the window.
        let resolution = resolve_slots(
            &schedule((9, 0), (10, 45), 30),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert_eq!(resolution.available_slots, vec!["09:00", "09:30", "10:00"]);
    }

    #[test]
    fn late_evening_window_stops_at_the_last_full_slot() {
        // 22:30 + 30min lands exactly on the 23:30 close; 23:00 + 60min
        // would wrap past midnight if the walk used NaiveTime addition.
        let resolution = resolve_slots(
            &schedule((22, 0), (23, 30), 30),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert_eq!(resolution.available_slots, vec!["22:00", "22:30", "23:00"]);
    }

    #[test]
    fn window_ending_at_midnight_minus_one_is_finite() {
        let resolution = resolve_slots(
            &schedule((23, 0), (23, 59), 30),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert_eq!(resolution.available_slots, vec!["23:00"]);
    }

    #[test]
    fn zero_granularity_is_empty() {
        let resolution = resolve_slots(
            &schedule((9, 0), (12, 0), 0),
            monday(),
            &HashSet::new(),
            far_in_the_past(),
        );
        assert!(resolution.available_slots.is_empty());
    }

    #[test]
    fn fully_claimed_day_yields_message() {
        let claims: HashSet<String> = candidate_slots(&schedule((9, 0), (10, 0), 30), monday())
            .into_iter()
            .collect();
        let resolution = resolve_slots(
            &schedule((9, 0), (10, 0), 30),
            monday(),
            &claims,
            far_in_the_past(),
        );
        assert!(resolution.available_slots.is_empty());
        assert_eq!(resolution.message.as_deref(), Some(NO_SLOTS_MESSAGE));
    }
}
