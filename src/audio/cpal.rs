// Microphone capture via cpal.
//
// cpal streams are not Send, so a dedicated thread owns the stream for the
// lifetime of the capture. Samples are converted to interleaved i16 PCM in
// the device callback and forwarded over a bounded channel; the consumer
// dropping its receiver simply causes frames to be discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig, CaptureError};

pub struct CpalBackend {
    config: CaptureConfig,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    capturing: bool,
}

impl CpalBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for CpalBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.capturing {
            return Err(CaptureError::Unknown("capture already started".into()));
        }

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&self.stop_flag);
        let config = self.config.clone();

        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), CaptureError>>();

        let worker = std::thread::spawn(move || {
            match open_stream(&config, frame_tx, Arc::clone(&stop_flag)) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    while !stop_flag.load(Ordering::Acquire) {
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    drop(stream);
                    debug!("cpal capture thread exiting");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| CaptureError::Unknown(format!("capture startup task failed: {e}")))?
            .map_err(|_| CaptureError::Unknown("capture thread exited before startup".into()))?;

        match ready {
            Ok(()) => {
                self.worker = Some(worker);
                self.capturing = true;
                Ok(frame_rx)
            }
            Err(e) => {
                let _ = worker.join();
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        self.stop_flag.store(true, Ordering::Release);
        self.capturing = false;

        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || {
                if worker.join().is_err() {
                    warn!("cpal capture thread panicked during shutdown");
                }
            })
            .await?;
        }

        info!("microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// Converts device callbacks into timestamped frames.
struct Forwarder {
    tx: mpsc::Sender<AudioFrame>,
    stop_flag: Arc<AtomicBool>,
    sample_rate: u32,
    channels: u16,
    samples_sent: u64,
}

impl Forwarder {
    fn push(&mut self, samples: Vec<i16>) {
        if self.stop_flag.load(Ordering::Relaxed) || samples.is_empty() {
            return;
        }

        let per_second = u64::from(self.sample_rate) * u64::from(self.channels);
        let timestamp_ms = self.samples_sent * 1000 / per_second;
        self.samples_sent += samples.len() as u64;

        let frame = AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            timestamp_ms,
        };

        // Receiver backpressure or teardown is not an error here; stale
        // frames are dropped rather than blocking the device callback.
        let _ = self.tx.try_send(frame);
    }
}

fn open_stream(
    config: &CaptureConfig,
    tx: mpsc::Sender<AudioFrame>,
    stop_flag: Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    if config.echo_cancellation || config.noise_suppression || config.auto_gain_control {
        debug!("capture processing hints are not applied by the cpal host; capturing raw input");
    }

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureError::DeviceNotFound)?;
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let supported = device
        .default_input_config()
        .map_err(classify_config_error)?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();
    let sample_format = supported.sample_format();

    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let mut forwarder = Forwarder {
        tx,
        stop_flag,
        sample_rate,
        channels,
        samples_sent: 0,
    };

    let err_fn = |err: cpal::StreamError| {
        warn!("capture stream error: {}", err);
    };

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    forwarder.push(samples);
                },
                err_fn,
                None,
            )
            .map_err(classify_build_error)?,
        cpal::SampleFormat::I16 => device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    forwarder.push(data.to_vec());
                },
                err_fn,
                None,
            )
            .map_err(classify_build_error)?,
        format => {
            return Err(CaptureError::Unsupported(format!(
                "sample format {:?}",
                format
            )));
        }
    };

    stream.play().map_err(classify_play_error)?;

    info!(
        "microphone capture started: {} ({}Hz, {} channels, {:?})",
        device_name, sample_rate, channels, sample_format
    );

    Ok(stream)
}

fn classify_config_error(err: cpal::DefaultStreamConfigError) -> CaptureError {
    match err {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceNotFound,
        cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            CaptureError::Unsupported("input stream type not supported".into())
        }
        cpal::DefaultStreamConfigError::BackendSpecific { err } => {
            classify_backend_message(err.description)
        }
    }
}

fn classify_build_error(err: cpal::BuildStreamError) -> CaptureError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceBusy,
        cpal::BuildStreamError::StreamConfigNotSupported => {
            CaptureError::ConstraintViolation("stream config not supported".into())
        }
        cpal::BuildStreamError::InvalidArgument => {
            CaptureError::ConstraintViolation("invalid stream argument".into())
        }
        cpal::BuildStreamError::StreamIdOverflow => {
            CaptureError::Unknown("stream id overflow".into())
        }
        cpal::BuildStreamError::BackendSpecific { err } => {
            classify_backend_message(err.description)
        }
    }
}

fn classify_play_error(err: cpal::PlayStreamError) -> CaptureError {
    match err {
        cpal::PlayStreamError::DeviceNotAvailable => CaptureError::DeviceBusy,
        cpal::PlayStreamError::BackendSpecific { err } => classify_backend_message(err.description),
    }
}

// Hosts report permission problems as backend-specific strings, so the
// classification has to go by message content.
fn classify_backend_message(description: String) -> CaptureError {
    let lower = description.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not permitted") {
        CaptureError::PermissionDenied
    } else if lower.contains("privacy") || lower.contains("tcc") {
        CaptureError::SecurityRestriction(description)
    } else {
        CaptureError::Unknown(description)
    }
}
