//! Speaker toggle
//!
//! Tracks the intended mute target and applies it to every registered
//! media output. The record owns no capture resource; its only effect is
//! on the outputs handed to it.

use serde::Serialize;
use tracing::debug;

/// A mutable playback surface the speaker toggle acts on.
pub trait MediaOutput: Send + Sync {
    fn set_muted(&self, muted: bool);
    fn label(&self) -> &str;
}

/// Snapshot of the speaker record for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerStatus {
    pub is_on: bool,
    pub output_count: usize,
}

pub struct Speaker {
    is_on: bool,
    outputs: Vec<Box<dyn MediaOutput>>,
}

impl Speaker {
    pub fn new() -> Self {
        Self {
            is_on: true,
            outputs: Vec::new(),
        }
    }

    /// Register a playback surface. The current intent is applied right
    /// away so outputs added after a toggle still match `is_on`.
    pub fn register(&mut self, output: Box<dyn MediaOutput>) {
        output.set_muted(!self.is_on);
        debug!("media output registered: {}", output.label());
        self.outputs.push(output);
    }

    /// Unmute every registered output.
    pub fn turn_on(&mut self) {
        self.apply(false);
    }

    /// Mute every registered output.
    pub fn turn_off(&mut self) {
        self.apply(true);
    }

    fn apply(&mut self, muted: bool) {
        for output in &self.outputs {
            output.set_muted(muted);
            debug!(
                "speaker {}: {}",
                if muted { "muted" } else { "unmuted" },
                output.label()
            );
        }
        self.is_on = !muted;
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn status(&self) -> SpeakerStatus {
        SpeakerStatus {
            is_on: self.is_on,
            output_count: self.outputs.len(),
        }
    }
}

impl Default for Speaker {
    fn default() -> Self {
        Self::new()
    }
}
