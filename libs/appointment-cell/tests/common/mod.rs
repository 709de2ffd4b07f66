use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use appointment_cell::services::booking::BookingCoordinator;
use appointment_cell::services::events::{AppointmentEvent, AppointmentEvents};
use appointment_cell::services::ledger::AppointmentLedger;
use appointment_cell::models::{AppointmentType, BookAppointmentRequest};
use doctor_cell::models::{DayRule, UpsertScheduleRequest};
use doctor_cell::services::schedule::ScheduleDirectory;
use shared_models::actor::{Actor, ActorRole};

pub struct TestHarness {
    pub coordinator: Arc<BookingCoordinator>,
    pub ledger: Arc<AppointmentLedger>,
    pub schedules: Arc<ScheduleDirectory>,
    pub events: UnboundedReceiver<AppointmentEvent>,
}

/// Coordinator wired against a fresh in-memory ledger and schedule directory.
pub fn harness() -> TestHarness {
    let schedules = Arc::new(ScheduleDirectory::new(30));
    let ledger = Arc::new(AppointmentLedger::new());
    let (events, event_rx) = AppointmentEvents::channel();
    let coordinator = Arc::new(BookingCoordinator::new(
        Arc::clone(&ledger),
        Arc::clone(&schedules),
        events,
    ));
    TestHarness {
        coordinator,
        ledger,
        schedules,
        events: event_rx,
    }
}

/// Register a doctor available 09:00-12:00 every day except Sunday,
/// 30-minute slots. Returns the doctor id.
pub fn register_doctor(schedules: &ScheduleDirectory) -> Uuid {
    let doctor_id = Uuid::new_v4();
    let day_rules = (0..7)
        .map(|day| DayRule {
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            is_available: day != 0,
        })
        .collect();
    schedules
        .upsert(
            doctor_id,
            UpsertScheduleRequest {
                day_rules,
                consultation_fee: 50.0,
                emergency_available: false,
                slot_granularity_minutes: Some(30),
            },
        )
        .unwrap();
    doctor_id
}

/// 2025-03-10, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// Early on the Sunday before `monday()`; everything that week is bookable.
pub fn sunday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 9)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

pub fn patient() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: ActorRole::Patient,
    }
}

pub fn doctor_actor(doctor_id: Uuid) -> Actor {
    Actor {
        id: doctor_id,
        role: ActorRole::Doctor,
    }
}

pub fn admin() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: ActorRole::Admin,
    }
}

pub fn booking_request(doctor_id: Uuid, date: NaiveDate, slot: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id: None,
        doctor_id,
        date,
        time_slot: slot.to_string(),
        appointment_type: AppointmentType::Consultation,
        symptoms: Some("Persistent cough".to_string()),
        notes: None,
    }
}
