// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::actor::{Actor, ActorRole};
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, AppointmentStatus, AppointmentType,
    BookAppointmentRequest, CompleteAppointmentRequest, TransitionRequest,
};
use crate::services::booking::BookingCoordinator;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentQueryParams {
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
// HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Query(params): Query<AvailableSlotsQuery>,
    Extension(_actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let resolution = coordinator
        .available_slots(params.doctor_id, params.date)
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "available_slots": resolution.available_slots,
        "message": resolution.message,
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = coordinator
        .book(&actor, request)
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn transition_appointment(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Path(appointment_id): Path<Uuid>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = coordinator
        .transition(&actor, appointment_id, request.status, request.reason)
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Path(appointment_id): Path<Uuid>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = coordinator
        .complete(&actor, appointment_id, request.prescription)
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment completed successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Path(appointment_id): Path<Uuid>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let appointment = coordinator
        .get(appointment_id)
        .map_err(map_appointment_error)?;

    // Only the involved patient, the involved doctor, or an admin may view.
    let is_patient = appointment.patient_id == actor.id;
    let is_doctor = appointment.doctor_id == actor.id;
    if !is_patient && !is_doctor && !actor.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this appointment".to_string(),
        ));
    }

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(coordinator): State<Arc<BookingCoordinator>>,
    Query(params): Query<AppointmentQueryParams>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let mut query = AppointmentSearchQuery {
        patient_id: params.patient_id,
        doctor_id: params.doctor_id,
        status: params.status,
        appointment_type: params.appointment_type,
        from_date: params.from_date,
        to_date: params.to_date,
        limit: params.limit,
        offset: params.offset,
    };

    // Non-admins only ever see their own appointments, whatever filters they
    // asked for.
    match actor.role {
        ActorRole::Admin => {}
        ActorRole::Doctor => query.doctor_id = Some(actor.id),
        ActorRole::Patient => query.patient_id = Some(actor.id),
    }

    let page = coordinator.search(&query);

    Ok(Json(json!({
        "appointments": page.appointments,
        "total": page.total,
        "limit": params.limit,
        "offset": params.offset
    })))
}

fn map_appointment_error(error: AppointmentError) -> AppError {
    match error {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::SlotConflict => AppError::Conflict(
            "Appointment slot no longer available; refresh availability and retry".to_string(),
        ),
        AppointmentError::SlotNotAvailable => {
            AppError::BadRequest("Requested time slot is not available".to_string())
        }
        AppointmentError::InvalidTransition { .. } => AppError::BadRequest(error.to_string()),
        AppointmentError::ReasonRequired => {
            AppError::BadRequest("A cancellation reason is required".to_string())
        }
        AppointmentError::Validation(msg) => AppError::ValidationError(msg),
        AppointmentError::Unauthorized => {
            AppError::Forbidden("Not authorized to act on this appointment".to_string())
        }
    }
}
