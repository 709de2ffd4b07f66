// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::actor::{Actor, ActorRole};
use shared_models::error::AppError;

use crate::models::UpsertScheduleRequest;
use crate::services::schedule::ScheduleDirectory;

/// Replace a doctor's weekly schedule. Stands in for the external
/// profile-management collaborator; doctors may only write their own
/// schedule, admins any.
#[axum::debug_handler]
pub async fn upsert_schedule(
    State(directory): State<Arc<ScheduleDirectory>>,
    Path(doctor_id): Path<Uuid>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<UpsertScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let is_own_schedule = actor.role == ActorRole::Doctor && actor.id == doctor_id;
    if !is_own_schedule && !actor.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to manage this doctor's schedule".to_string(),
        ));
    }

    let schedule = directory
        .upsert(doctor_id, request)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule,
        "message": "Schedule saved successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(directory): State<Arc<ScheduleDirectory>>,
    Path(doctor_id): Path<Uuid>,
    Extension(_actor): Extension<Actor>,
) -> Result<Json<Value>, AppError> {
    let schedule = directory
        .get(doctor_id)
        .ok_or_else(|| AppError::NotFound("Doctor schedule not found".to_string()))?;

    Ok(Json(json!(schedule)))
}
