use super::state::AppState;
use crate::chat::{self, ChatLogPayload, RecordedChat};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetailResponse {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct ChatSaveResponse {
    pub success: bool,
    pub message: String,
    pub data: RecordedChat,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub success: bool,
}

// ============================================================================
// Original interfaces
// ============================================================================

/// POST /api/chat/save
/// Validate and record a conversation payload
pub async fn save_chat(Json(payload): Json<Value>) -> impl IntoResponse {
    let timestamp_present = payload
        .get("timestamp")
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    let conversations_is_array = payload
        .get("conversations")
        .map(Value::is_array)
        .unwrap_or(false);

    if !timestamp_present || !conversations_is_array {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid chat payload format".to_string(),
            }),
        )
            .into_response();
    }

    let payload: ChatLogPayload = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("invalid chat payload: {}", e),
                }),
            )
                .into_response();
        }
    };

    match chat::record(&payload) {
        Ok(data) => (
            StatusCode::OK,
            Json(ChatSaveResponse {
                success: true,
                message: "conversation saved".to_string(),
                data,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("failed to record conversation: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorDetailResponse {
                    error: "failed to record conversation".to_string(),
                    details: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/transcribe
/// Transcribe one uploaded audio file (multipart field "audio")
pub async fn transcribe_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut audio: Option<(Vec<u8>, String)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let is_audio = field.name() == Some("audio");
                let file_name = field.file_name().unwrap_or("audio.wav").to_string();

                if !is_audio {
                    continue;
                }

                match field.bytes().await {
                    Ok(bytes) => audio = Some((bytes.to_vec(), file_name)),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: format!("failed to read audio field: {}", e),
                            }),
                        )
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("invalid multipart request: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    }

    let Some((bytes, file_name)) = audio else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "an audio file is required".to_string(),
            }),
        )
            .into_response();
    };

    info!(
        "transcribing upload: {} ({} bytes) via {}",
        file_name,
        bytes.len(),
        state.transcriber.name()
    );

    match state.transcriber.transcribe(&bytes, &file_name).await {
        Ok(text) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                text,
                success: true,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("transcription failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "transcription failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/example
/// API usage description
pub async fn api_example() -> impl IntoResponse {
    Json(json!({
        "message": "voicebox API usage",
        "endpoints": {
            "transcribe": {
                "url": "/api/transcribe",
                "method": "POST",
                "description": "Transcribe one audio file",
                "request": {
                    "contentType": "multipart/form-data",
                    "body": { "audio": "audio file" }
                },
                "response": {
                    "success": { "text": "transcribed text", "success": true },
                    "error": { "error": "error message" }
                }
            },
            "chatSave": {
                "url": "/api/chat/save",
                "method": "POST",
                "description": "Record a finished question/answer run",
                "request": {
                    "contentType": "application/json",
                    "body": {
                        "timestamp": "ISO-8601 string",
                        "totalQuestions": 5,
                        "conversations": [{ "question": "...", "answer": "..." }]
                    }
                }
            },
            "audioControl": {
                "url": "/api/audio/*",
                "description": "Microphone, recording and speaker controls; GET /api/audio/status for the composed state"
            }
        }
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Audio control surface
// ============================================================================

/// GET /api/audio/status
/// Composed status of the three audio records
pub async fn audio_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.panel.status().await)
}

/// POST /api/audio/mic/on
/// Request microphone access; no-op when already on
pub async fn mic_on(State(state): State<AppState>) -> impl IntoResponse {
    if state.panel.microphone().is_on().await {
        debug!("microphone already on; request ignored");
    } else {
        state.panel.microphone().request_permission().await;
    }
    Json(state.panel.status().await)
}

/// POST /api/audio/mic/off
pub async fn mic_off(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.microphone().turn_off().await;
    Json(state.panel.status().await)
}

/// POST /api/audio/record/start
pub async fn record_start(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.start_recording().await;
    Json(state.panel.status().await)
}

/// POST /api/audio/record/stop
pub async fn record_stop(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.recorder().stop().await;
    Json(state.panel.status().await)
}

/// POST /api/audio/record/clear
pub async fn record_clear(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.recorder().clear().await;
    Json(state.panel.status().await)
}

/// POST /api/audio/record/submit
/// Submit the recorded artifact for transcription
pub async fn record_submit(State(state): State<AppState>) -> impl IntoResponse {
    let Some(artifact) = state.panel.recorded_artifact().await else {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "no recorded audio to submit".to_string(),
            }),
        )
            .into_response();
    };

    let wav = match artifact.to_wav() {
        Ok(wav) => wav,
        Err(e) => {
            error!("failed to encode recorded artifact: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to encode recorded audio".to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.transcriber.transcribe(&wav, "audio.wav").await {
        Ok(text) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                text,
                success: true,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("transcription failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "transcription failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/audio/speaker/on
pub async fn speaker_on(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.speaker_on().await;
    Json(state.panel.status().await)
}

/// POST /api/audio/speaker/off
pub async fn speaker_off(State(state): State<AppState>) -> impl IntoResponse {
    state.panel.speaker_off().await;
    Json(state.panel.status().await)
}
