//! Microphone lifecycle
//!
//! Owns the toggleable capture stream. Acquisition failures are captured
//! into state and surfaced as inline status, never returned to callers.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::audio::{CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};

/// Snapshot of the microphone record for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct MicStatus {
    pub is_on: bool,
    pub error: Option<String>,
}

struct MicState {
    /// Exclusive ownership of the open capture feed, if any. The feed is
    /// held open but not consumed; recording acquires its own stream.
    backend: Option<Box<dyn CaptureBackend>>,
    is_on: bool,
    error: Option<String>,
    /// Bumped by every stop/cleanup so a permission grant that resolves
    /// after an interleaved stop can be detected and released.
    epoch: u64,
}

pub struct Microphone {
    source: CaptureSource,
    config: CaptureConfig,
    state: Mutex<MicState>,
}

impl Microphone {
    pub fn new(source: CaptureSource, config: CaptureConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(MicState {
                backend: None,
                is_on: false,
                error: None,
                epoch: 0,
            }),
        }
    }

    /// Request the platform for an audio input stream.
    ///
    /// On success the granted stream is stored and `is_on` flips true; any
    /// previously held stream is stopped first. On failure the error is
    /// recorded in state. The lock is released while the grant is pending,
    /// so a stop or cleanup may interleave; a grant that resolves against a
    /// stale epoch is stopped immediately instead of being stored.
    pub async fn request_permission(&self) {
        let epoch = {
            let mut state = self.state.lock().await;
            state.error = None;
            state.epoch
        };

        let mut backend = CaptureBackendFactory::create(self.source, self.config.clone());
        let acquired = backend.start().await;

        let mut state = self.state.lock().await;
        match acquired {
            Ok(_frames) => {
                if state.epoch != epoch {
                    debug!("microphone grant resolved after stop; releasing stale stream");
                    if let Err(e) = backend.stop().await {
                        warn!("failed to release stale capture stream: {}", e);
                    }
                    return;
                }

                if let Some(mut previous) = state.backend.take() {
                    if let Err(e) = previous.stop().await {
                        warn!("failed to stop previous capture stream: {}", e);
                    }
                }

                info!("microphone on ({})", backend.name());
                state.backend = Some(backend);
                state.is_on = true;
                state.error = None;
            }
            Err(e) => {
                warn!("microphone access failed: {}", e);
                state.error = Some(format!("microphone access failed: {}", e));
            }
        }
    }

    /// Stop the held stream, if any, and reset the record.
    ///
    /// A stop failure is logged and never prevents the state reset.
    pub async fn turn_off(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;

        if let Some(mut backend) = state.backend.take() {
            if let Err(e) = backend.stop().await {
                warn!("failed to stop capture stream: {}", e);
            }
            info!("microphone off");
        }

        state.is_on = false;
        state.error = None;
    }

    /// Unconditional teardown. Identical to `turn_off`; idempotent and safe
    /// to call when never turned on.
    pub async fn cleanup(&self) {
        self.turn_off().await;
    }

    pub async fn is_on(&self) -> bool {
        self.state.lock().await.is_on
    }

    pub async fn status(&self) -> MicStatus {
        let state = self.state.lock().await;
        MicStatus {
            is_on: state.is_on,
            error: state.error.clone(),
        }
    }

    /// Acquisition parameters shared with the recording session.
    pub fn capture_config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }
}
