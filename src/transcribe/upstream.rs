use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Result, TranscribeError, Transcriber};

/// Configuration for the upstream transcription client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Bearer token for the transcription API
    pub api_key: String,

    /// Whisper-compatible transcriptions endpoint
    pub endpoint: String,

    /// Model name sent with each request
    pub model: String,

    /// Language hint, if any
    pub language: Option<String>,
}

/// Client for a whisper-compatible transcription API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Transcriber for UpstreamClient {
    async fn transcribe(&self, audio: &[u8], file_name: &str) -> Result<String> {
        debug!(
            model = self.config.model.as_str(),
            audio_bytes = audio.len(),
            "Sending transcription request upstream"
        );

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name(file_name.to_string())
                    .mime_str("audio/wav")
                    .map_err(|e| TranscribeError::Upstream(e.to_string()))?,
            )
            .part(
                "model",
                reqwest::multipart::Part::text(self.config.model.clone()),
            );

        if let Some(lang) = &self.config.language {
            form = form.part("language", reqwest::multipart::Part::text(lang.clone()));
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Upstream(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let transcription: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::Upstream(e.to_string()))?;

        Ok(transcription.text)
    }

    fn name(&self) -> &str {
        "upstream"
    }
}
