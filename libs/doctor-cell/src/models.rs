// libs/doctor-cell/src/models.rs
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One weekday's recurring availability window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRule {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

/// A doctor's recurring weekly schedule. Owned by profile management; the
/// scheduling core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub doctor_id: Uuid,
    /// Exactly one rule per weekday, ordered Sunday through Saturday.
    pub day_rules: Vec<DayRule>,
    pub consultation_fee: f64,
    pub emergency_available: bool,
    pub slot_granularity_minutes: u32,
}

impl DoctorSchedule {
    /// Rule governing the given calendar date.
    pub fn rule_for(&self, date: NaiveDate) -> Option<&DayRule> {
        let day = day_of_week_index(date);
        self.day_rules.iter().find(|r| r.day_of_week == day)
    }
}

/// Map a date onto the schedule's Sunday-based weekday index.
pub fn day_of_week_index(date: NaiveDate) -> u8 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    pub day_rules: Vec<DayRule>,
    pub consultation_fee: f64,
    #[serde(default)]
    pub emergency_available: bool,
    pub slot_granularity_minutes: Option<u32>,
}
