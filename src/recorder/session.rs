use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::RecorderConfig;
use super::state::{RecorderEvent, RecorderState, RecordingStatus};
use crate::audio::{
    AudioArtifact, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig,
    CaptureSource, Fragment,
};
use crate::mic::Microphone;

/// A recording session in flight: the stop signal and the task driving it.
struct ActiveSession {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Drives recording sessions against the recording state machine
///
/// Each session acquires a fresh capture stream, independent of the
/// microphone toggle stream, and owns it until the session ends. Failures
/// are folded into the state record; no operation here returns an error.
pub struct Recorder {
    source: CaptureSource,
    capture_config: CaptureConfig,
    config: RecorderConfig,
    state: Arc<Mutex<RecorderState>>,
    session: Mutex<Option<ActiveSession>>,
}

impl Recorder {
    pub fn new(source: CaptureSource, capture_config: CaptureConfig, config: RecorderConfig) -> Self {
        let state = RecorderState::new(config.sample_rate, config.channels);
        Self {
            source,
            capture_config,
            config,
            state: Arc::new(Mutex::new(state)),
            session: Mutex::new(None),
        }
    }

    /// Start a recording session.
    ///
    /// Requires the microphone record to report on; otherwise a
    /// recording-level error is set and nothing else happens. Starting
    /// while already capturing is a silent no-op.
    pub async fn start(&self, mic: &Microphone) {
        if !mic.is_on().await {
            self.state.lock().await.apply(RecorderEvent::Errored(
                "cannot start recording: microphone is off".to_string(),
            ));
            return;
        }

        let mut session = self.session.lock().await;
        if let Some(active) = session.as_ref() {
            if !active.task.is_finished() {
                debug!("recording already in progress; start ignored");
                return;
            }
        }

        let mut backend = CaptureBackendFactory::create(self.source, self.capture_config.clone());
        let frames = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => {
                warn!("recording capture acquisition failed: {}", e);
                self.state
                    .lock()
                    .await
                    .apply(RecorderEvent::Errored(format!("recording failed: {}", e)));
                return;
            }
        };

        let session_id = Uuid::new_v4();
        self.state
            .lock()
            .await
            .apply(RecorderEvent::Started { session_id });
        info!("recording session started: {}", session_id);

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(
            backend,
            frames,
            stop_rx,
            Arc::clone(&self.state),
            self.config.clone(),
        ));

        *session = Some(ActiveSession { stop_tx, task });
    }

    /// Request the active session to stop, producing the artifact.
    ///
    /// With no session capturing this logs and leaves state untouched.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        match session.take() {
            Some(active) => {
                let _ = active.stop_tx.send(true);
                if let Err(e) = active.task.await {
                    error!("recording session task failed: {}", e);
                    self.state
                        .lock()
                        .await
                        .apply(RecorderEvent::Errored(format!("recording failed: {}", e)));
                }
            }
            None => debug!("stop requested with no active recording session"),
        }
    }

    /// Dispatch to start or stop based on the current recording flag.
    pub async fn toggle(&self, mic: &Microphone) {
        if self.is_recording().await {
            self.stop().await;
        } else {
            self.start(mic).await;
        }
    }

    /// Discard everything: stop any in-flight session, drop its output,
    /// and reset the record to its empty initial form.
    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        if let Some(active) = session.take() {
            let _ = active.stop_tx.send(true);
            if let Err(e) = active.task.await {
                error!("recording session task failed during clear: {}", e);
            }
        }
        drop(session);

        self.state.lock().await.apply(RecorderEvent::Cleared);
        debug!("recording record cleared");
    }

    pub async fn is_recording(&self) -> bool {
        self.state.lock().await.is_recording()
    }

    pub async fn artifact(&self) -> Option<AudioArtifact> {
        self.state.lock().await.artifact().cloned()
    }

    pub async fn status(&self) -> RecordingStatus {
        self.state.lock().await.status()
    }
}

/// Session task: turns the capture feed into ordered fragment deliveries
/// and closes the session with a stop event once the feed ends.
async fn run_session(
    mut backend: Box<dyn CaptureBackend>,
    mut frames: mpsc::Receiver<AudioFrame>,
    mut stop_rx: watch::Receiver<bool>,
    state: Arc<Mutex<RecorderState>>,
    config: RecorderConfig,
) {
    let fragment_bytes = config.fragment_bytes();
    let mut pending: Vec<u8> = Vec::new();
    let mut sequence: u64 = 0;

    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Some(frame) => {
                        let frame = normalize_frame(frame, config.sample_rate, config.channels);
                        pending.extend(frame.to_pcm_bytes());

                        while pending.len() >= fragment_bytes {
                            let rest = pending.split_off(fragment_bytes);
                            let data = std::mem::replace(&mut pending, rest);
                            state
                                .lock()
                                .await
                                .apply(RecorderEvent::Data(Fragment::new(sequence, data)));
                            sequence += 1;
                        }
                    }
                    // Capture feed ended on its own.
                    None => break,
                }
            }
            _ = stop_rx.changed() => break,
        }
    }

    // Final partial delivery before the session closes.
    if !pending.is_empty() {
        state
            .lock()
            .await
            .apply(RecorderEvent::Data(Fragment::new(sequence, pending)));
    }

    // Release the session's private capture stream before finalizing.
    if let Err(e) = backend.stop().await {
        warn!("failed to stop recording capture stream: {}", e);
    }

    state.lock().await.apply(RecorderEvent::Stopped);
}

/// Normalize a frame to the recording format: downsample and fold to the
/// target channel count where needed.
fn normalize_frame(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    let mut processed = frame;

    if processed.sample_rate != target_sample_rate {
        processed = downsample_frame(processed, target_sample_rate);
    }

    if processed.channels != target_channels && target_channels == 1 {
        processed = stereo_to_mono(processed);
    }

    processed
}

/// Downsample audio frame by decimation
fn downsample_frame(frame: AudioFrame, target_rate: u32) -> AudioFrame {
    if frame.sample_rate == target_rate {
        return frame;
    }

    let ratio = frame.sample_rate / target_rate;
    if ratio <= 1 {
        return frame; // Can't upsample
    }

    let downsampled: Vec<i16> = frame
        .samples
        .iter()
        .step_by(ratio as usize)
        .copied()
        .collect();

    AudioFrame {
        samples: downsampled,
        sample_rate: target_rate,
        channels: frame.channels,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Convert stereo to mono by summing channels
fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels == 1 {
        return frame;
    }

    if frame.channels != 2 {
        return frame; // Only support stereo -> mono
    }

    let mut mono_samples = Vec::with_capacity(frame.samples.len() / 2);

    // Sum left and right channels (no division to preserve volume)
    for chunk in frame.samples.chunks_exact(2) {
        let left = chunk[0] as i32;
        let right = chunk[1] as i32;
        let sum = left + right;
        let mono = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        mono_samples.push(mono);
    }

    AudioFrame {
        samples: mono_samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}
