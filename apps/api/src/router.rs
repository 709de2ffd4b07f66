use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::booking::BookingCoordinator;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::schedule::ScheduleDirectory;

pub fn create_router(
    schedules: Arc<ScheduleDirectory>,
    coordinator: Arc<BookingCoordinator>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/doctors", doctor_routes(schedules))
        .nest("/appointments", appointment_routes(coordinator))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
