use serde::{Deserialize, Serialize};

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Duration of each delivered fragment in milliseconds
    /// Default: 1000 (one second of audio per fragment)
    pub fragment_duration_ms: u64,

    /// Sample rate recorded fragments are normalized to
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl RecorderConfig {
    /// Size of one full fragment in PCM bytes.
    pub fn fragment_bytes(&self) -> usize {
        (u64::from(self.sample_rate)
            * u64::from(self.channels)
            * 2
            * self.fragment_duration_ms
            / 1000)
            .max(2) as usize
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            fragment_duration_ms: 1000,
            sample_rate: 16000,
            channels: 1,
        }
    }
}
