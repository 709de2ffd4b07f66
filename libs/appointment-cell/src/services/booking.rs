// libs/appointment-cell/src/services/booking.rs
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::services::availability::{candidate_slots, resolve_slots, SlotResolution};
use doctor_cell::services::schedule::ScheduleDirectory;
use shared_models::actor::{Actor, ActorRole};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    BookAppointmentRequest, Prescription, SearchPage,
};
use crate::services::events::{AppointmentEvent, AppointmentEvents};
use crate::services::ledger::{AppointmentLedger, ClaimAction};

/// The transactional boundary of the scheduling core. Booking requests are
/// re-validated against the ledger at commit time, and every post-creation
/// status change flows through here.
pub struct BookingCoordinator {
    ledger: Arc<AppointmentLedger>,
    schedules: Arc<ScheduleDirectory>,
    events: AppointmentEvents,
}

impl BookingCoordinator {
    pub fn new(
        ledger: Arc<AppointmentLedger>,
        schedules: Arc<ScheduleDirectory>,
        events: AppointmentEvents,
    ) -> Self {
        Self {
            ledger,
            schedules,
            events,
        }
    }

    /// Resolve the currently bookable slots for a doctor and date.
    pub fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<SlotResolution, AppointmentError> {
        self.available_slots_at(doctor_id, date, clinic_now())
    }

    pub fn available_slots_at(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<SlotResolution, AppointmentError> {
        let schedule = self
            .schedules
            .get(doctor_id)
            .ok_or(AppointmentError::DoctorNotFound)?;
        let claims = self.ledger.claims_for(doctor_id, date);
        Ok(resolve_slots(&schedule, date, &claims, now))
    }

    /// Book a slot. At most one caller wins the race for a given
    /// `(doctor, date, slot)` tuple; losers observe `SlotConflict` and are
    /// expected to re-resolve availability and retry with fresh data.
    pub fn book(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        self.book_at(actor, request, clinic_now())
    }

    #[instrument(skip(self, actor, request), fields(doctor_id = %request.doctor_id, date = %request.date, slot = %request.time_slot))]
    pub fn book_at(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let patient_id = self.booking_patient(actor, &request)?;

        // Malformed input is rejected before the ledger is ever touched.
        if NaiveTime::parse_from_str(&request.time_slot, "%H:%M").is_err() {
            return Err(AppointmentError::Validation(format!(
                "Time slot must be formatted HH:MM, got '{}'",
                request.time_slot
            )));
        }
        if request.date < now.date() {
            return Err(AppointmentError::Validation(
                "Cannot book an appointment on a past date".to_string(),
            ));
        }

        let schedule = self
            .schedules
            .get(request.doctor_id)
            .ok_or(AppointmentError::DoctorNotFound)?;

        // The slot must sit on the doctor's candidate grid for that date and
        // must not have passed already today. Claimed-slot races are left to
        // the ledger's conditional write.
        if !candidate_slots(&schedule, request.date).contains(&request.time_slot) {
            return Err(AppointmentError::SlotNotAvailable);
        }
        if request.date == now.date() && request.time_slot <= now.time().format("%H:%M").to_string()
        {
            return Err(AppointmentError::SlotNotAvailable);
        }

        let created_at = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: request.doctor_id,
            date: request.date,
            time_slot: request.time_slot,
            appointment_type: request.appointment_type,
            symptoms: request.symptoms,
            notes: request.notes,
            status: AppointmentStatus::Pending,
            cancellation_reason: None,
            prescription: None,
            created_at,
            updated_at: created_at,
        };

        let committed = self.ledger.insert_if_absent(appointment)?;
        info!("Appointment {} booked for patient {}", committed.id, patient_id);

        self.events.emit(AppointmentEvent {
            appointment_id: committed.id,
            patient_id: committed.patient_id,
            doctor_id: committed.doctor_id,
            status: committed.status,
            previous_status: None,
        });
        Ok(committed)
    }

    /// Drive an appointment along one edge of the status state machine. Any
    /// `(status, role, target)` combination outside the table fails with
    /// `InvalidTransition` and leaves the record unchanged.
    pub fn transition(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        target: AppointmentStatus,
        reason: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        self.transition_at(actor, appointment_id, target, reason, clinic_now())
    }

    #[instrument(skip(self, actor, reason), fields(role = %actor.role, target = %target))]
    pub fn transition_at(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        target: AppointmentStatus,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<Appointment, AppointmentError> {
        let actor = actor.clone();
        let reason = normalized_reason(reason);
        let mut previous_status = None;

        let updated = self.ledger.update(appointment_id, |current| {
            authorize_participant(&actor, current)?;
            previous_status = Some(current.status);

            let invalid = || AppointmentError::InvalidTransition {
                from: current.status,
                to: target,
                role: actor.role,
            };

            let mut updated = current.clone();
            updated.updated_at = Utc::now();

            let claim_action = match (current.status, actor.role, target) {
                // Admin arbitration of pending requests.
                (AppointmentStatus::Pending, ActorRole::Admin, AppointmentStatus::Confirmed) => {
                    ClaimAction::Keep
                }

                // Deny/cancel with a mandatory reason.
                (
                    AppointmentStatus::Pending | AppointmentStatus::Confirmed,
                    ActorRole::Admin | ActorRole::Doctor,
                    AppointmentStatus::Cancelled,
                ) => {
                    let reason = reason.clone().ok_or(AppointmentError::ReasonRequired)?;
                    updated.cancellation_reason = Some(reason);
                    ClaimAction::Release
                }

                // Patient withdrawal, pre-confirmation only; reason optional.
                (AppointmentStatus::Pending, ActorRole::Patient, AppointmentStatus::Cancelled) => {
                    updated.cancellation_reason = reason.clone();
                    ClaimAction::Release
                }

                // The doctor closing a visit through the status endpoint;
                // the prescription-bearing variant is `complete`.
                (AppointmentStatus::Confirmed, ActorRole::Doctor, AppointmentStatus::Completed) => {
                    ClaimAction::Release
                }

                // Reopening an erroneous cancellation: only forward onto a
                // date that has not passed, and only if the slot can be won
                // back.
                (AppointmentStatus::Cancelled, ActorRole::Admin, AppointmentStatus::Confirmed) => {
                    if current.date < now.date() {
                        return Err(AppointmentError::Validation(
                            "Cannot reopen an appointment whose date has passed".to_string(),
                        ));
                    }
                    updated.cancellation_reason = None;
                    ClaimAction::Reacquire
                }

                _ => return Err(invalid()),
            };

            updated.status = target;
            Ok((updated, claim_action))
        })?;

        info!(
            "Appointment {} transitioned {} -> {}",
            appointment_id,
            previous_status.map(|s| s.to_string()).unwrap_or_default(),
            updated.status
        );
        self.events.emit(AppointmentEvent {
            appointment_id: updated.id,
            patient_id: updated.patient_id,
            doctor_id: updated.doctor_id,
            status: updated.status,
            previous_status,
        });
        Ok(updated)
    }

    /// Close a confirmed visit, optionally attaching a prescription. The
    /// prescription is validated before any write; the status flip and the
    /// attachment commit together or not at all.
    #[instrument(skip(self, actor, prescription))]
    pub fn complete(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        prescription: Option<Prescription>,
    ) -> Result<Appointment, AppointmentError> {
        if actor.role != ActorRole::Doctor {
            return Err(AppointmentError::Unauthorized);
        }
        if let Some(prescription) = &prescription {
            prescription.validate()?;
        }

        let actor = actor.clone();
        let mut previous_status = None;
        let updated = self.ledger.update(appointment_id, |current| {
            authorize_participant(&actor, current)?;
            previous_status = Some(current.status);

            if current.status != AppointmentStatus::Confirmed {
                return Err(AppointmentError::InvalidTransition {
                    from: current.status,
                    to: AppointmentStatus::Completed,
                    role: actor.role,
                });
            }

            let mut updated = current.clone();
            updated.status = AppointmentStatus::Completed;
            updated.prescription = prescription.clone();
            updated.updated_at = Utc::now();
            Ok((updated, ClaimAction::Release))
        })?;

        info!(
            "Appointment {} completed{}",
            appointment_id,
            if updated.prescription.is_some() {
                " with prescription"
            } else {
                ""
            }
        );
        self.events.emit(AppointmentEvent {
            appointment_id: updated.id,
            patient_id: updated.patient_id,
            doctor_id: updated.doctor_id,
            status: updated.status,
            previous_status,
        });
        Ok(updated)
    }

    pub fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.ledger.get(appointment_id).ok_or(AppointmentError::NotFound)
    }

    /// Read path for the dashboards; no business rules live here.
    pub fn search(&self, query: &AppointmentSearchQuery) -> SearchPage {
        debug!("Searching appointments with filters: {:?}", query);
        self.ledger.search(query)
    }

    fn booking_patient(
        &self,
        actor: &Actor,
        request: &BookAppointmentRequest,
    ) -> Result<Uuid, AppointmentError> {
        match actor.role {
            ActorRole::Patient => {
                if let Some(patient_id) = request.patient_id {
                    if patient_id != actor.id {
                        warn!("Patient {} attempted to book for {}", actor.id, patient_id);
                        return Err(AppointmentError::Unauthorized);
                    }
                }
                Ok(actor.id)
            }
            ActorRole::Admin => request.patient_id.ok_or_else(|| {
                AppointmentError::Validation(
                    "patient_id is required when an admin books".to_string(),
                )
            }),
            ActorRole::Doctor => Err(AppointmentError::Unauthorized),
        }
    }
}

/// Doctors and patients may only act on their own appointments.
fn authorize_participant(actor: &Actor, appointment: &Appointment) -> Result<(), AppointmentError> {
    let authorized = match actor.role {
        ActorRole::Admin => true,
        ActorRole::Doctor => appointment.doctor_id == actor.id,
        ActorRole::Patient => appointment.patient_id == actor.id,
    };
    if authorized {
        Ok(())
    } else {
        Err(AppointmentError::Unauthorized)
    }
}

/// Trimmed, non-empty cancellation reason or nothing.
fn normalized_reason(reason: Option<String>) -> Option<String> {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

/// The clinic's local wall clock; all scheduling times are clinic-local.
fn clinic_now() -> NaiveDateTime {
    Local::now().naive_local()
}
