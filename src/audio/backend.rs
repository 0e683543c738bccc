use thiserror::Error;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Interleaved samples as little-endian PCM bytes.
    pub fn to_pcm_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Configuration for capture acquisition
///
/// The processing hints mirror what a capture request asks the platform
/// for. Backends that cannot apply a hint log it and capture anyway.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (will convert if needed)
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub target_channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
    /// Ask the platform to cancel acoustic echo
    pub echo_cancellation: bool,
    /// Ask the platform to suppress background noise
    pub noise_suppression: bool,
    /// Ask the platform to normalize input gain
    pub auto_gain_control: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // 16kHz for transcription upstreams
            target_channels: 1,        // Mono
            buffer_duration_ms: 100,   // 100ms buffers
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Classified capture acquisition/stream failure
///
/// Every platform failure is folded into one of these variants so the
/// state layer can expose a stable, human-readable reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied: allow microphone access and retry")]
    PermissionDenied,
    #[error("no capture device found")]
    DeviceNotFound,
    #[error("capture device is busy (in use by another application)")]
    DeviceBusy,
    #[error("capture is not supported: {0}")]
    Unsupported(String),
    #[error("security restriction: {0}")]
    SecurityRestriction(String),
    #[error("requested capture constraints cannot be satisfied: {0}")]
    ConstraintViolation(String),
    #[error("capture failed: {0}")]
    Unknown(String),
}

/// Audio capture backend trait
///
/// Implementations:
/// - cpal: default input device (microphone)
/// - synthetic: deterministic generated frames (tests, headless hosts)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. The
    /// channel closes when the capture feed ends on its own.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> anyhow::Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Default input device via cpal
    Microphone,
    /// Deterministic generated frames; `frame_count: None` runs until stopped
    Synthetic { frame_count: Option<usize> },
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    /// Create a capture backend for the given source.
    ///
    /// Each call produces an independent backend owning its own device
    /// handle; two backends may capture simultaneously.
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Box<dyn CaptureBackend> {
        match source {
            CaptureSource::Microphone => Box::new(super::cpal::CpalBackend::new(config)),
            CaptureSource::Synthetic { frame_count } => {
                Box::new(super::synthetic::SyntheticBackend::new(config, frame_count))
            }
        }
    }
}
