// libs/doctor-cell/src/services/schedule.rs
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{DoctorSchedule, UpsertScheduleRequest};

/// Process-local registry of doctor schedules.
///
/// Schedules are owned and written by profile management; the scheduling core
/// reads them. This directory is the hand-off point between the two.
pub struct ScheduleDirectory {
    schedules: RwLock<HashMap<Uuid, DoctorSchedule>>,
    default_granularity_minutes: u32,
}

impl ScheduleDirectory {
    pub fn new(default_granularity_minutes: u32) -> Self {
        Self {
            schedules: RwLock::new(HashMap::new()),
            default_granularity_minutes,
        }
    }

    /// Validate and store a doctor's weekly schedule, replacing any previous
    /// version.
    pub fn upsert(&self, doctor_id: Uuid, request: UpsertScheduleRequest) -> Result<DoctorSchedule> {
        let granularity = request
            .slot_granularity_minutes
            .unwrap_or(self.default_granularity_minutes);
        if granularity == 0 {
            return Err(anyhow!("Slot granularity must be greater than zero"));
        }

        if request.day_rules.len() != 7 {
            return Err(anyhow!(
                "Schedule must contain exactly 7 day rules, got {}",
                request.day_rules.len()
            ));
        }

        let mut seen = [false; 7];
        for rule in &request.day_rules {
            if rule.day_of_week > 6 {
                return Err(anyhow!(
                    "Day of week must be between 0 (Sunday) and 6 (Saturday)"
                ));
            }
            if seen[rule.day_of_week as usize] {
                return Err(anyhow!("Duplicate rule for day of week {}", rule.day_of_week));
            }
            seen[rule.day_of_week as usize] = true;

            if rule.is_available && rule.start_time >= rule.end_time {
                return Err(anyhow!("Start time must be before end time"));
            }
        }

        if request.consultation_fee < 0.0 {
            return Err(anyhow!("Consultation fee cannot be negative"));
        }

        let mut day_rules = request.day_rules;
        day_rules.sort_by_key(|r| r.day_of_week);

        let schedule = DoctorSchedule {
            doctor_id,
            day_rules,
            consultation_fee: request.consultation_fee,
            emergency_available: request.emergency_available,
            slot_granularity_minutes: granularity,
        };

        self.schedules
            .write()
            .expect("schedule directory lock poisoned")
            .insert(doctor_id, schedule.clone());

        debug!("Schedule stored for doctor {}", doctor_id);
        Ok(schedule)
    }

    pub fn get(&self, doctor_id: Uuid) -> Option<DoctorSchedule> {
        self.schedules
            .read()
            .expect("schedule directory lock poisoned")
            .get(&doctor_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRule;
    use chrono::NaiveTime;

    fn full_week() -> Vec<DayRule> {
        (0..7)
            .map(|day| DayRule {
                day_of_week: day,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                is_available: true,
            })
            .collect()
    }

    fn request(day_rules: Vec<DayRule>) -> UpsertScheduleRequest {
        UpsertScheduleRequest {
            day_rules,
            consultation_fee: 40.0,
            emergency_available: false,
            slot_granularity_minutes: Some(30),
        }
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let directory = ScheduleDirectory::new(30);
        let doctor_id = Uuid::new_v4();
        directory.upsert(doctor_id, request(full_week())).unwrap();

        let schedule = directory.get(doctor_id).unwrap();
        assert_eq!(schedule.doctor_id, doctor_id);
        assert_eq!(schedule.day_rules.len(), 7);
    }

    #[test]
    fn rejects_partial_week() {
        let directory = ScheduleDirectory::new(30);
        let mut rules = full_week();
        rules.pop();
        assert!(directory.upsert(Uuid::new_v4(), request(rules)).is_err());
    }

    #[test]
    fn rejects_duplicate_day() {
        let directory = ScheduleDirectory::new(30);
        let mut rules = full_week();
        rules[6].day_of_week = 0;
        assert!(directory.upsert(Uuid::new_v4(), request(rules)).is_err());
    }

    #[test]
    fn rejects_inverted_window_on_available_day() {
        let directory = ScheduleDirectory::new(30);
        let mut rules = full_week();
        rules[1].start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        assert!(directory.upsert(Uuid::new_v4(), request(rules)).is_err());
    }

    #[test]
    fn inverted_window_is_fine_on_closed_day() {
        let directory = ScheduleDirectory::new(30);
        let mut rules = full_week();
        rules[0].is_available = false;
        rules[0].start_time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        assert!(directory.upsert(Uuid::new_v4(), request(rules)).is_ok());
    }

    #[test]
    fn granularity_falls_back_to_directory_default() {
        let directory = ScheduleDirectory::new(15);
        let mut req = request(full_week());
        req.slot_granularity_minutes = None;
        let schedule = directory.upsert(Uuid::new_v4(), req).unwrap();
        assert_eq!(schedule.slot_granularity_minutes, 15);
    }
}
