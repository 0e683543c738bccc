// Tests for the microphone and speaker records

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use voicebox::audio::{CaptureConfig, CaptureSource};
use voicebox::mic::Microphone;
use voicebox::speaker::{MediaOutput, Speaker};

fn synthetic_mic() -> Microphone {
    Microphone::new(
        CaptureSource::Synthetic { frame_count: None },
        CaptureConfig::default(),
    )
}

#[tokio::test]
async fn test_microphone_on_then_off() {
    let mic = synthetic_mic();
    assert!(!mic.is_on().await);

    mic.request_permission().await;
    let status = mic.status().await;
    assert!(status.is_on);
    assert!(status.error.is_none());

    mic.turn_off().await;
    let status = mic.status().await;
    assert!(!status.is_on);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_double_turn_off_is_safe() {
    let mic = synthetic_mic();

    mic.request_permission().await;
    mic.turn_off().await;
    // Second call with no stream held must not fail or change the outcome.
    mic.turn_off().await;

    let status = mic.status().await;
    assert!(!status.is_on);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn test_cleanup_without_ever_turning_on() {
    let mic = synthetic_mic();

    mic.cleanup().await;
    mic.cleanup().await;

    assert!(!mic.is_on().await);
}

#[tokio::test]
async fn test_repeated_permission_requests_keep_mic_on() {
    let mic = synthetic_mic();

    mic.request_permission().await;
    // The layer is safe to call repeatedly; the previous stream is
    // released and replaced rather than leaked.
    mic.request_permission().await;

    let status = mic.status().await;
    assert!(status.is_on);
    assert!(status.error.is_none());

    mic.turn_off().await;
    assert!(!mic.is_on().await);
}

#[tokio::test]
async fn test_cleanup_after_recent_grant_leaves_mic_off() {
    let mic = synthetic_mic();

    // However a grant and a teardown interleave, the record must end up
    // off with no stream held.
    tokio::join!(mic.request_permission(), mic.cleanup());
    mic.cleanup().await;

    assert!(!mic.is_on().await);
}

// ============================================================================
// Speaker
// ============================================================================

struct TestOutput {
    muted: Arc<AtomicBool>,
    label: String,
}

impl TestOutput {
    fn new(label: &str) -> (Self, Arc<AtomicBool>) {
        let muted = Arc::new(AtomicBool::new(false));
        (
            Self {
                muted: Arc::clone(&muted),
                label: label.to_string(),
            },
            muted,
        )
    }
}

impl MediaOutput for TestOutput {
    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[test]
fn test_speaker_toggles_every_registered_output() {
    let mut speaker = Speaker::new();
    assert!(speaker.is_on());

    let (a, a_muted) = TestOutput::new("a");
    let (b, b_muted) = TestOutput::new("b");
    speaker.register(Box::new(a));
    speaker.register(Box::new(b));

    speaker.turn_off();
    assert!(!speaker.is_on());
    assert!(a_muted.load(Ordering::SeqCst));
    assert!(b_muted.load(Ordering::SeqCst));

    speaker.turn_on();
    assert!(speaker.is_on());
    assert!(!a_muted.load(Ordering::SeqCst));
    assert!(!b_muted.load(Ordering::SeqCst));
}

#[test]
fn test_late_registered_output_adopts_current_intent() {
    let mut speaker = Speaker::new();
    speaker.turn_off();

    let (late, late_muted) = TestOutput::new("late");
    speaker.register(Box::new(late));

    // Outputs that appear after a toggle still match the intended state.
    assert!(late_muted.load(Ordering::SeqCst));

    speaker.turn_on();
    assert!(!late_muted.load(Ordering::SeqCst));
}

#[test]
fn test_speaker_status_counts_outputs() {
    let mut speaker = Speaker::new();
    let (a, _) = TestOutput::new("a");
    speaker.register(Box::new(a));

    let status = speaker.status();
    assert!(status.is_on);
    assert_eq!(status.output_count, 1);
}
