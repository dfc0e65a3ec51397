//! spriteon-core — Face geometry remapping and sprite projection.
//!
//! Pure math shared by the live overlay and the photo compositor:
//! unit-space coordinate conversion, sensor-orientation remapping of
//! detected face boxes, and the sprite placement transform. Keeping
//! both render paths on this one module tree is the point — a box is
//! interpreted in exactly one place.

pub mod matrix;
pub mod project;
pub mod remap;
pub mod space;
pub mod types;

pub use matrix::Mat3;
pub use project::{project, SpritePlacement, Tuning};
pub use remap::{remap_face, remap_faces};
pub use types::{
    CameraPosition, DetectedFace, FrameGeometry, PixelRect, Platform, Point, RemappedFace,
    SensorOrientation, UnitRect,
};
