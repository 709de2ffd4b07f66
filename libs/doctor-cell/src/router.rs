// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_utils::extractor::actor_middleware;

use crate::handlers;
use crate::services::schedule::ScheduleDirectory;

pub fn doctor_routes(directory: Arc<ScheduleDirectory>) -> Router {
    Router::new()
        .route("/{doctor_id}/schedule", put(handlers::upsert_schedule))
        .route("/{doctor_id}/schedule", get(handlers::get_schedule))
        .layer(middleware::from_fn(actor_middleware))
        .with_state(directory)
}
