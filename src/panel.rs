//! Composed audio state
//!
//! The three sibling records (microphone, recording, speaker) are owned
//! here, each the single writer of its own fields, and surfaced to the
//! presentation layer as one status snapshot. Recording's dependency on
//! the microphone is wired through this composition.

use serde::Serialize;
use tokio::sync::Mutex;

use crate::audio::{AudioArtifact, CaptureConfig, CaptureSource};
use crate::mic::{MicStatus, Microphone};
use crate::recorder::{Recorder, RecorderConfig, RecordingStatus};
use crate::speaker::{MediaOutput, Speaker, SpeakerStatus};

/// Composed status of the three audio records.
#[derive(Debug, Clone, Serialize)]
pub struct PanelStatus {
    pub microphone: MicStatus,
    pub recording: RecordingStatus,
    pub speaker: SpeakerStatus,
}

pub struct AudioPanel {
    mic: Microphone,
    recorder: Recorder,
    speaker: Mutex<Speaker>,
}

impl AudioPanel {
    pub fn new(
        source: CaptureSource,
        capture_config: CaptureConfig,
        recorder_config: RecorderConfig,
    ) -> Self {
        Self {
            mic: Microphone::new(source, capture_config.clone()),
            recorder: Recorder::new(source, capture_config, recorder_config),
            speaker: Mutex::new(Speaker::new()),
        }
    }

    pub fn microphone(&self) -> &Microphone {
        &self.mic
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Start a recording session against the current microphone state.
    pub async fn start_recording(&self) {
        self.recorder.start(&self.mic).await;
    }

    pub async fn toggle_recording(&self) {
        self.recorder.toggle(&self.mic).await;
    }

    pub async fn recorded_artifact(&self) -> Option<AudioArtifact> {
        self.recorder.artifact().await
    }

    pub async fn register_output(&self, output: Box<dyn MediaOutput>) {
        self.speaker.lock().await.register(output);
    }

    pub async fn speaker_on(&self) {
        self.speaker.lock().await.turn_on();
    }

    pub async fn speaker_off(&self) {
        self.speaker.lock().await.turn_off();
    }

    /// Tear down every owned resource. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        self.recorder.clear().await;
        self.mic.cleanup().await;
    }

    pub async fn status(&self) -> PanelStatus {
        PanelStatus {
            microphone: self.mic.status().await,
            recording: self.recorder.status().await,
            speaker: self.speaker.lock().await.status(),
        }
    }
}
