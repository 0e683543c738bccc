use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Original API surface
        .route("/api/example", get(handlers::api_example))
        .route("/api/chat/save", post(handlers::save_chat))
        .route("/api/transcribe", post(handlers::transcribe_upload))
        // Audio control surface
        .route("/api/audio/status", get(handlers::audio_status))
        .route("/api/audio/mic/on", post(handlers::mic_on))
        .route("/api/audio/mic/off", post(handlers::mic_off))
        .route("/api/audio/record/start", post(handlers::record_start))
        .route("/api/audio/record/stop", post(handlers::record_stop))
        .route("/api/audio/record/clear", post(handlers::record_clear))
        .route("/api/audio/record/submit", post(handlers::record_submit))
        .route("/api/audio/speaker/on", post(handlers::speaker_on))
        .route("/api/audio/speaker/off", post(handlers::speaker_off))
        // Request logging, plus CORS for the browser-facing clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
