pub mod backend;
pub mod cpal;
pub mod fragment;
pub mod synthetic;

pub use backend::{
    AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureError, CaptureSource,
};
pub use fragment::{AudioArtifact, Fragment};
