//! Recording session management
//!
//! This module provides the recording half of the audio state machine:
//! - `RecorderState`: the pure transition machine over explicit events
//! - `Recorder`: async orchestration of capture sessions against it
//! - `RecorderConfig`: fragment sizing and recording format

mod config;
mod session;
mod state;

pub use config::RecorderConfig;
pub use session::Recorder;
pub use state::{RecorderEvent, RecorderState, RecordingStatus};
