use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::audio::{AudioArtifact, Fragment};

/// Transition events consumed by the recording state machine.
///
/// Platform callbacks (session started, data delivered, session stopped,
/// session errored) and the explicit discard action all arrive here as
/// events, so every transition is observable and testable in isolation.
#[derive(Debug)]
pub enum RecorderEvent {
    /// The capture session opened successfully.
    Started { session_id: Uuid },
    /// One fragment of encoded audio was delivered.
    Data(Fragment),
    /// The capture session ended; buffered fragments become the artifact.
    Stopped,
    /// The capture session failed; buffered fragments are discarded.
    Errored(String),
    /// Explicit discard: reset to the empty initial record.
    Cleared,
}

/// Snapshot of the recording record for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingStatus {
    pub is_recording: bool,
    pub session_id: Option<Uuid>,
    pub has_artifact: bool,
    pub artifact_bytes: usize,
    pub artifact_duration_secs: f64,
    pub error: Option<String>,
}

/// The recording record
///
/// Machine: Idle -> Capturing -> Idle-with-Artifact; Capturing ->
/// Idle-with-Error; any state -> Idle via Cleared. Resting states are
/// restartable.
#[derive(Debug)]
pub struct RecorderState {
    is_recording: bool,
    session_id: Option<Uuid>,
    fragments: Vec<Fragment>,
    artifact: Option<AudioArtifact>,
    error: Option<String>,
    sample_rate: u32,
    channels: u16,
}

impl RecorderState {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            is_recording: false,
            session_id: None,
            fragments: Vec::new(),
            artifact: None,
            error: None,
            sample_rate,
            channels,
        }
    }

    pub fn apply(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Started { session_id } => {
                if self.is_recording {
                    warn!("session start while already capturing; ignored");
                    return;
                }
                self.is_recording = true;
                self.session_id = Some(session_id);
                self.fragments.clear();
                self.artifact = None;
                self.error = None;
            }

            RecorderEvent::Data(fragment) => {
                if !self.is_recording {
                    debug!("fragment delivered outside a capturing session; dropped");
                    return;
                }
                if fragment.is_empty() {
                    return;
                }
                self.fragments.push(fragment);
            }

            RecorderEvent::Stopped => {
                if !self.is_recording {
                    debug!("stop event with no capturing session; ignored");
                    return;
                }
                let artifact =
                    AudioArtifact::from_fragments(&self.fragments, self.sample_rate, self.channels);
                debug!(
                    "session {} produced artifact: {} fragments, {} bytes",
                    self.session_id.map(|id| id.to_string()).unwrap_or_default(),
                    self.fragments.len(),
                    artifact.len()
                );
                self.artifact = Some(artifact);
                self.fragments.clear();
                self.session_id = None;
                self.is_recording = false;
            }

            RecorderEvent::Errored(message) => {
                // No partial artifact is produced on error.
                self.fragments.clear();
                self.session_id = None;
                self.is_recording = false;
                self.error = Some(message);
            }

            RecorderEvent::Cleared => {
                *self = Self::new(self.sample_rate, self.channels);
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> RecordingStatus {
        RecordingStatus {
            is_recording: self.is_recording,
            session_id: self.session_id,
            has_artifact: self.artifact.is_some(),
            artifact_bytes: self.artifact.as_ref().map(AudioArtifact::len).unwrap_or(0),
            artifact_duration_secs: self
                .artifact
                .as_ref()
                .map(AudioArtifact::duration_secs)
                .unwrap_or(0.0),
            error: self.error.clone(),
        }
    }
}
