pub mod audio;
pub mod chat;
pub mod config;
pub mod http;
pub mod mic;
pub mod panel;
pub mod recorder;
pub mod speaker;
pub mod transcribe;

pub use audio::{
    AudioArtifact, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureError,
    CaptureSource, Fragment,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use mic::{MicStatus, Microphone};
pub use panel::{AudioPanel, PanelStatus};
pub use recorder::{Recorder, RecorderConfig, RecorderEvent, RecorderState, RecordingStatus};
pub use speaker::{MediaOutput, Speaker, SpeakerStatus};
pub use transcribe::{
    PlaceholderTranscriber, Transcriber, UpstreamClient, UpstreamConfig, PLACEHOLDER_TRANSCRIPT,
};
