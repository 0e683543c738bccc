use async_trait::async_trait;
use tracing::info;

use super::{Result, Transcriber};

/// Fixed transcript returned when no API key is configured.
pub const PLACEHOLDER_TRANSCRIPT: &str =
    "This is a placeholder transcript. Configure a transcription API key to enable real speech-to-text.";

/// Credential-free fallback transcriber.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderTranscriber;

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String> {
        info!(
            "no transcription credentials configured; returning placeholder for {} ({} bytes)",
            file_name,
            audio.len()
        );
        Ok(PLACEHOLDER_TRANSCRIPT.to_string())
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}
