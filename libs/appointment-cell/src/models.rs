// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::actor::ActorRole;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Calendar day in clinic-local time, no time-of-day component.
    pub date: NaiveDate,
    /// One of the slots the resolver produced for this doctor and date at
    /// creation time, formatted `HH:MM`. Immutable once committed; a changed
    /// time is a cancellation plus a new booking.
    pub time_slot: String,
    pub appointment_type: AppointmentType,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    /// Required non-empty when an admin or doctor cancels; patient
    /// withdrawals may leave it unset.
    pub cancellation_reason: Option<String>,
    pub prescription: Option<Prescription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment currently occupies its slot.
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum AppointmentType {
    #[serde(alias = "general_checkup", alias = "checkup")]
    GeneralCheckup,

    #[serde(alias = "follow_up", alias = "followup")]
    FollowUp,

    #[serde(alias = "consultation")]
    Consultation,

    #[serde(alias = "emergency")]
    Emergency,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::GeneralCheckup => write!(f, "GeneralCheckup"),
            AppointmentType::FollowUp => write!(f, "FollowUp"),
            AppointmentType::Consultation => write!(f, "Consultation"),
            AppointmentType::Emergency => write!(f, "Emergency"),
        }
    }
}

// ==============================================================================
// PRESCRIPTION MODELS
// ==============================================================================

/// Attached atomically with the `completed` transition; immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub diagnosis: String,
    pub medications: Vec<Medication>,
    pub tests: Option<Vec<String>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

impl Prescription {
    /// Well-formedness check performed before anything is written, so a
    /// malformed prescription can never leave a half-completed appointment.
    pub fn validate(&self) -> Result<(), AppointmentError> {
        if self.diagnosis.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "Prescription diagnosis cannot be empty".to_string(),
            ));
        }
        if self.medications.is_empty() {
            return Err(AppointmentError::Validation(
                "Prescription must list at least one medication".to_string(),
            ));
        }
        for medication in &self.medications {
            if medication.name.trim().is_empty()
                || medication.dosage.trim().is_empty()
                || medication.frequency.trim().is_empty()
                || medication.duration.trim().is_empty()
            {
                return Err(AppointmentError::Validation(
                    "Medication entries must have name, dosage, frequency and duration".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    /// Honored for admin callers only; patients always book themselves.
    pub patient_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub appointment_type: AppointmentType,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AppointmentStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub prescription: Option<Prescription>,
}

/// One page of search results plus the total match count, so callers can
/// page past `limit`/`offset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub appointments: Vec<Appointment>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment slot is already booked")]
    SlotConflict,

    #[error("Requested time slot is not available for this doctor and date")]
    SlotNotAvailable,

    #[error("Transition from {from} to {to} is not permitted for {role}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
        role: ActorRole,
    },

    #[error("A cancellation reason is required")]
    ReasonRequired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized to act on this appointment")]
    Unauthorized,
}
