use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::Cursor;

/// A slice of encoded audio delivered while a recording session captures
///
/// Fragments are appended in delivery order; the order is significant for
/// correct reassembly into an artifact.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Position in the delivery sequence (0-indexed)
    pub sequence: u64,
    /// Interleaved i16 little-endian PCM bytes
    pub data: Vec<u8>,
}

impl Fragment {
    pub fn new(sequence: u64, data: Vec<u8>) -> Self {
        Self { sequence, data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The finalized audio object produced when a recording session ends
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// Concatenated fragment payloads, in delivery order
    pub data: Vec<u8>,
    /// Content type label of the encoded payload
    pub content_type: String,
    /// Sample rate of the PCM payload
    pub sample_rate: u32,
    /// Number of channels in the PCM payload
    pub channels: u16,
    /// When the artifact was assembled
    pub created_at: DateTime<Utc>,
}

impl AudioArtifact {
    /// Assemble an artifact by concatenating fragments in delivery order.
    pub fn from_fragments(fragments: &[Fragment], sample_rate: u32, channels: u16) -> Self {
        let mut data = Vec::with_capacity(fragments.iter().map(|f| f.data.len()).sum());
        for fragment in fragments {
            data.extend_from_slice(&fragment.data);
        }

        Self {
            data,
            content_type: "audio/wav".to_string(),
            sample_rate,
            channels,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration of the PCM payload in seconds.
    pub fn duration_secs(&self) -> f64 {
        let bytes_per_second = f64::from(self.sample_rate) * f64::from(self.channels) * 2.0;
        self.data.len() as f64 / bytes_per_second
    }

    /// Wrap the PCM payload in a WAV container for submission upstream.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .context("Failed to create WAV writer")?;

            for chunk in self.data.chunks_exact(2) {
                let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }

            writer.finalize().context("Failed to finalize WAV data")?;
        }

        Ok(cursor.into_inner())
    }
}
