//! HTTP API server
//!
//! This module provides the REST surface of the service:
//! - POST /api/chat/save - Record a finished conversation run
//! - POST /api/transcribe - Transcribe one uploaded audio file
//! - GET /api/example - API usage description
//! - POST /api/audio/* - Microphone, recording and speaker controls
//! - GET /api/audio/status - Composed audio state
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
