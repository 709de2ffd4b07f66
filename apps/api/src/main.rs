use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::booking::BookingCoordinator;
use appointment_cell::services::events::AppointmentEvents;
use appointment_cell::services::ledger::AppointmentLedger;
use doctor_cell::services::schedule::ScheduleDirectory;
use shared_config::AppConfig;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    let config = AppConfig::from_env();

    // Wire the core: schedule directory, appointment ledger, outbound events.
    let schedules = Arc::new(ScheduleDirectory::new(
        config.default_slot_granularity_minutes,
    ));
    let ledger = Arc::new(AppointmentLedger::new());
    let (events, mut event_rx) = AppointmentEvents::channel();
    let coordinator = Arc::new(BookingCoordinator::new(
        Arc::clone(&ledger),
        Arc::clone(&schedules),
        events,
    ));

    // Notifier stand-in: committed transitions are observed here and handed
    // to notification delivery, which is outside this service. Its failure
    // never rolls back into appointment state.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!(
                "Appointment {} for patient {} is now {}",
                event.appointment_id, event.patient_id, event.status
            );
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(schedules, coordinator)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid HOST/PORT configuration");
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
