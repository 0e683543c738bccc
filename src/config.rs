use anyhow::Result;
use serde::Deserialize;

use crate::audio::{CaptureConfig, CaptureSource};
use crate::recorder::RecorderConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Capture source: "microphone" or "synthetic"
    pub source: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub fragment_duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub model: String,
    pub language: Option<String>,
    /// Absent key selects the placeholder transcriber
    pub api_key: Option<String>,
}

impl AudioConfig {
    pub fn capture_source(&self) -> Result<CaptureSource> {
        match self.source.as_str() {
            "microphone" => Ok(CaptureSource::Microphone),
            "synthetic" => Ok(CaptureSource::Synthetic { frame_count: None }),
            other => anyhow::bail!("unknown audio source: {}", other),
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            target_sample_rate: self.sample_rate,
            target_channels: self.channels,
            ..CaptureConfig::default()
        }
    }

    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            fragment_duration_ms: self.fragment_duration_ms,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl Config {
    /// Load configuration from an optional file layered under environment
    /// variables (VOICEBOX_ prefix, "__" separator), e.g.
    /// VOICEBOX_TRANSCRIPTION__API_KEY.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "voicebox")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 3000i64)?
            .set_default("audio.source", "microphone")?
            .set_default("audio.sample_rate", 16000i64)?
            .set_default("audio.channels", 1i64)?
            .set_default("audio.fragment_duration_ms", 1000i64)?
            .set_default(
                "transcription.endpoint",
                "https://api.openai.com/v1/audio/transcriptions",
            )?
            .set_default("transcription.model", "whisper-1")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("VOICEBOX").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
