//! Collaborator seams for the live pipeline.
//!
//! The pipeline owns no camera stack, detector model, or storage — it
//! consumes them through these traits so the engine stays agnostic of
//! platform glue (and so tests can drive it with scripted fakes).

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use spriteon_core::{DetectedFace, FrameGeometry};
use thiserror::Error;

/// One camera frame as handed to the detector. Pixel data is shared,
/// so cloning a frame is cheap.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Monotonic frame counter from the source.
    pub sequence: u64,
    pub timestamp: Instant,
}

/// A full-resolution still from the capture primitive.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Reference to a photo persisted in user-visible storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPhoto {
    pub uri: String,
}

/// A single frame's detection failed. Recovered per frame — the
/// session treats it as zero faces and keeps running.
#[derive(Error, Debug)]
#[error("face detection failed: {0}")]
pub struct DetectorError(pub String);

/// The capture primitive failed to produce a still. Fatal to the
/// current capture.
#[derive(Error, Debug)]
#[error("photo capture failed: {0}")]
pub struct ShutterError(pub String);

/// Persisting the final image failed. Fatal to the current capture.
#[derive(Error, Debug)]
#[error("gallery save failed: {0}")]
pub struct SaveError(pub String);

/// Live camera feed. Orientation, position, and dimensions are static
/// for the life of the session, so the geometry is exposed once rather
/// than per frame.
pub trait FrameSource {
    fn geometry(&self) -> FrameGeometry;

    /// The next frame to process, skipping any that arrived while the
    /// caller was busy. `None` means the feed has ended.
    fn next_frame(&mut self) -> impl Future<Output = Option<CameraFrame>> + Send;
}

/// External face detector: raw, uncorrected boxes plus pose angles.
/// May legitimately return zero faces.
pub trait FaceDetector {
    fn detect(&mut self, frame: &CameraFrame) -> Result<Vec<DetectedFace>, DetectorError>;
}

/// One-shot full-resolution photo capture.
pub trait PhotoCapture {
    fn capture(&mut self) -> impl Future<Output = Result<CapturedPhoto, ShutterError>> + Send;
}

/// Persists encoded bytes to user-visible storage.
pub trait GallerySink {
    fn save(&mut self, data: Vec<u8>) -> impl Future<Output = Result<SavedPhoto, SaveError>> + Send;
}
