// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::actor_middleware;

use crate::handlers;
use crate::services::booking::BookingCoordinator;

pub fn appointment_routes(coordinator: Arc<BookingCoordinator>) -> Router {
    Router::new()
        .route("/available-slots", get(handlers::get_available_slots))
        .route("/", post(handlers::book_appointment))
        .route("/search", get(handlers::search_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", patch(handlers::transition_appointment))
        .route("/{appointment_id}/complete", patch(handlers::complete_appointment))
        .layer(middleware::from_fn(actor_middleware))
        .with_state(coordinator)
}
