//! spriteon-pipeline — The live AR pipeline around the core geometry.
//!
//! Wires the external collaborators (frame source, face detector,
//! photo capture, gallery) to the remap/project/compose math: a
//! detection loop that publishes remapped faces through a single-slot
//! latest-wins mailbox, and a one-shot capture controller that freezes
//! the face snapshot at shutter time and drives the compositor off the
//! UI context.

pub mod capture;
pub mod mailbox;
pub mod session;
pub mod traits;

pub use capture::{CaptureController, CaptureError, CaptureOutcome, CaptureStage};
pub use mailbox::{mailbox, FaceSnapshot, Publisher, Viewer};
pub use session::{LiveSession, MailboxFrames};
pub use traits::{
    CameraFrame, CapturedPhoto, DetectorError, FaceDetector, FrameSource, GallerySink,
    PhotoCapture, SaveError, SavedPhoto, ShutterError,
};
