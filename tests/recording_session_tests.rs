// Integration tests for recording sessions
//
// These tests run the async Recorder against the deterministic synthetic
// capture backend and verify the observable state transitions.

use anyhow::Result;
use std::io::Cursor;
use std::time::Duration;

use voicebox::audio::synthetic::sample_at;
use voicebox::audio::{CaptureConfig, CaptureSource};
use voicebox::mic::Microphone;
use voicebox::recorder::{Recorder, RecorderConfig};

fn capture_config() -> CaptureConfig {
    CaptureConfig {
        target_sample_rate: 1000,
        target_channels: 1,
        buffer_duration_ms: 100, // 100 samples per synthetic frame
        ..CaptureConfig::default()
    }
}

fn recorder_config() -> RecorderConfig {
    RecorderConfig {
        fragment_duration_ms: 100, // 200 bytes per fragment
        sample_rate: 1000,
        channels: 1,
    }
}

fn recorder(source: CaptureSource) -> Recorder {
    Recorder::new(source, capture_config(), recorder_config())
}

/// Microphone that reports on, backed by an open-ended synthetic feed.
async fn mic_on() -> Microphone {
    let mic = Microphone::new(
        CaptureSource::Synthetic { frame_count: None },
        capture_config(),
    );
    mic.request_permission().await;
    assert!(mic.is_on().await);
    mic
}

/// Expected PCM bytes for the first `samples` synthetic samples.
fn expected_bytes(samples: u64) -> Vec<u8> {
    (0..samples).flat_map(|i| sample_at(i).to_le_bytes()).collect()
}

async fn wait_for_artifact(recorder: &Recorder) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !recorder.status().await.has_artifact {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn test_start_requires_microphone_on() {
    let mic = Microphone::new(
        CaptureSource::Synthetic { frame_count: None },
        capture_config(),
    );
    let recorder = recorder(CaptureSource::Synthetic { frame_count: Some(3) });

    recorder.start(&mic).await;

    let status = recorder.status().await;
    assert!(!status.is_recording);
    assert!(!status.has_artifact);
    let error = status.error.expect("recording-level error expected");
    assert!(error.contains("microphone is off"), "got: {error}");
}

#[tokio::test]
async fn test_finite_feed_produces_ordered_artifact() -> Result<()> {
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: Some(5) });

    recorder.start(&mic).await;
    wait_for_artifact(&recorder).await?;

    let artifact = recorder.artifact().await.expect("artifact after feed end");
    // 5 frames x 100 samples, concatenated in delivery order
    assert_eq!(artifact.data, expected_bytes(500));
    assert_eq!(artifact.sample_rate, 1000);
    assert_eq!(artifact.channels, 1);
    assert!((artifact.duration_secs() - 0.5).abs() < 1e-9);

    let status = recorder.status().await;
    assert!(!status.is_recording);
    assert!(status.error.is_none());

    mic.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_explicit_stop_flushes_in_order() -> Result<()> {
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: None });

    recorder.start(&mic).await;
    assert!(recorder.is_recording().await);

    tokio::time::sleep(Duration::from_millis(250)).await;
    recorder.stop().await;

    let artifact = recorder.artifact().await.expect("artifact after stop");
    assert!(!artifact.is_empty());
    assert_eq!(artifact.data.len() % 2, 0);
    // Whatever was captured must be an order-preserving prefix of the feed.
    assert_eq!(artifact.data, expected_bytes(artifact.data.len() as u64 / 2));
    assert!(!recorder.is_recording().await);

    mic.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_stop_without_session_leaves_state_unchanged() {
    let recorder = recorder(CaptureSource::Synthetic { frame_count: Some(1) });

    let before = recorder.status().await;
    recorder.stop().await;
    let after = recorder.status().await;

    assert_eq!(before.is_recording, after.is_recording);
    assert_eq!(before.has_artifact, after.has_artifact);
    assert_eq!(before.error, after.error);
}

#[tokio::test]
async fn test_second_start_is_a_silent_no_op() -> Result<()> {
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: None });

    recorder.start(&mic).await;
    let first = recorder.status().await.session_id.expect("active session");

    recorder.start(&mic).await;
    let status = recorder.status().await;
    assert_eq!(status.session_id, Some(first), "Session must not restart");
    assert!(status.error.is_none());

    recorder.stop().await;
    mic.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_clear_resets_mid_capture_and_allows_restart() -> Result<()> {
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: None });

    recorder.start(&mic).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    recorder.clear().await;
    let status = recorder.status().await;
    assert!(!status.is_recording);
    assert!(!status.has_artifact, "Clear must discard captured audio");
    assert!(status.error.is_none());
    assert!(status.session_id.is_none());

    // The machine is restartable from the cleared record.
    recorder.start(&mic).await;
    assert!(recorder.is_recording().await);
    recorder.clear().await;

    mic.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_recording_survives_mic_toggle_off() -> Result<()> {
    // The session owns a private capture stream; releasing the toggle
    // stream mid-recording must not end the session.
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: None });

    recorder.start(&mic).await;
    mic.turn_off().await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(recorder.is_recording().await);

    recorder.stop().await;
    assert!(recorder.artifact().await.is_some());
    Ok(())
}

#[tokio::test]
async fn test_artifact_wav_wrapping() -> Result<()> {
    let mic = mic_on().await;
    let recorder = recorder(CaptureSource::Synthetic { frame_count: Some(2) });

    recorder.start(&mic).await;
    wait_for_artifact(&recorder).await?;
    let artifact = recorder.artifact().await.expect("artifact");

    let wav = artifact.to_wav()?;
    let reader = hound::WavReader::new(Cursor::new(wav))?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 1000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let samples: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    let expected: Vec<i16> = (0..200).map(sample_at).collect();
    assert_eq!(samples, expected);

    mic.cleanup().await;
    Ok(())
}
