use std::sync::Arc;

use crate::panel::AudioPanel;
use crate::transcribe::Transcriber;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The composed audio state machine
    pub panel: Arc<AudioPanel>,
    /// Transcription client selected at startup
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    pub fn new(panel: Arc<AudioPanel>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self { panel, transcriber }
    }
}
