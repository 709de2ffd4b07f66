pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{DayRule, DoctorSchedule, UpsertScheduleRequest};
pub use services::availability::{resolve_slots, SlotResolution, NO_SLOTS_MESSAGE};
pub use services::schedule::ScheduleDirectory;
