//! Transcription clients
//!
//! Recorded audio is forwarded to a whisper-compatible HTTP API, or
//! answered with a fixed transcript when no credentials are configured so
//! the service stays usable without an account.

mod placeholder;
mod upstream;

pub use placeholder::{PlaceholderTranscriber, PLACEHOLDER_TRANSCRIPT};
pub use upstream::{UpstreamClient, UpstreamConfig};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("upstream transcription failed: {0}")]
    Upstream(String),

    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TranscribeError>;

/// Turns an audio payload into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String>;

    /// Client name for logging.
    fn name(&self) -> &str;
}
