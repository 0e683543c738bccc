// Deterministic capture backend.
//
// Produces frames whose sample values are a pure function of the running
// sample index, so consumers can predict captured bytes exactly. Used by
// the test suite and as the capture source on hosts without input devices.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig, CaptureError};

/// Sample value at a given running sample index.
pub fn sample_at(index: u64) -> i16 {
    (index % 32768) as i16
}

pub struct SyntheticBackend {
    config: CaptureConfig,
    /// Number of frames to produce before ending the feed; `None` runs
    /// paced at the configured buffer duration until stopped.
    frame_count: Option<usize>,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
    capturing: bool,
}

impl SyntheticBackend {
    pub fn new(config: CaptureConfig, frame_count: Option<usize>) -> Self {
        Self {
            config,
            frame_count,
            stop_tx: None,
            task: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SyntheticBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.capturing {
            return Err(CaptureError::Unknown("capture already started".into()));
        }

        let sample_rate = self.config.target_sample_rate;
        let channels = self.config.target_channels;
        let samples_per_frame =
            (u64::from(sample_rate) * u64::from(channels) * self.config.buffer_duration_ms / 1000)
                .max(1) as usize;
        let pace = std::time::Duration::from_millis(self.config.buffer_duration_ms);
        let frame_count = self.frame_count;

        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut index: u64 = 0;
            let mut produced = 0usize;

            loop {
                if *stop_rx.borrow() {
                    break;
                }
                if let Some(limit) = frame_count {
                    if produced >= limit {
                        break;
                    }
                }

                let samples: Vec<i16> =
                    (0..samples_per_frame as u64).map(|i| sample_at(index + i)).collect();
                let per_second = u64::from(sample_rate) * u64::from(channels);
                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                    timestamp_ms: index * 1000 / per_second,
                };
                index += samples_per_frame as u64;

                tokio::select! {
                    res = tx.send(frame) => {
                        if res.is_err() {
                            break;
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
                produced += 1;

                // Bounded runs are for tests; only pace the open-ended feed.
                if frame_count.is_none() {
                    tokio::select! {
                        _ = tokio::time::sleep(pace) => {}
                        _ = stop_rx.changed() => break,
                    }
                }
            }

            debug!("synthetic capture feed ended ({} frames)", produced);
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);
        self.capturing = true;

        Ok(rx)
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
