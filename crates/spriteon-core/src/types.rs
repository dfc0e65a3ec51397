use serde::{Deserialize, Serialize};

/// A 2D point, used in both pixel space and unit space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Rectangle in unit space: center-origin, each axis normalized to its
/// own frame dimension so the full frame spans [-1, 1] per axis.
///
/// `x`/`y` are the top-left corner and may be negative; `width` and
/// `height` are always >= 0. Aspect ratio is not preserved across axes
/// — a square face is not a square `UnitRect` unless the frame is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl UnitRect {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// Rectangle in absolute pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Physical rotation of the camera sensor relative to the device's
/// upright orientation, as reported by the platform camera API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SensorOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl SensorOrientation {
    pub fn is_portrait(&self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitUpsideDown)
    }
}

/// Which physical camera produced the session's frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
}

/// Mobile platform the frames originate from. iOS and Android report
/// sensor orientation and box origins differently; see `remap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

/// Session-static context needed to interpret a raw detected face box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Frame width in sensor pixel order (before any axis swap).
    pub frame_width: f64,
    /// Frame height in sensor pixel order (before any axis swap).
    pub frame_height: f64,
    pub sensor_orientation: SensorOrientation,
    pub position: CameraPosition,
    pub platform: Platform,
}

impl FrameGeometry {
    /// Whether the raw box axes must be swapped to reach the upright
    /// logical frame. iOS reports a portrait sensor orientation while
    /// the detector's frame is effectively landscape; Android's
    /// non-portrait reporting has the inverse effect.
    pub fn swaps_axes(&self) -> bool {
        let portrait = self.sensor_orientation.is_portrait();
        match self.platform {
            Platform::Ios => portrait,
            Platform::Android => !portrait,
        }
    }

    /// Logical (upright) frame dimensions: `(width, height)` after any
    /// axis swap.
    pub fn logical_size(&self) -> (f64, f64) {
        if self.swaps_axes() {
            (self.frame_height, self.frame_width)
        } else {
            (self.frame_width, self.frame_height)
        }
    }

    /// Whether the horizontal axis must be flipped when projecting back
    /// to a render target. Only the iOS front camera presents a
    /// mirrored preview the face coordinates do not account for;
    /// Android front frames arrive already mirrored upstream.
    pub fn mirrors_x(&self) -> bool {
        self.platform == Platform::Ios && self.position == CameraPosition::Front
    }
}

/// Raw face from the external detector. The bounding box is in sensor
/// pixel space — axes and origin depend on platform and sensor
/// orientation, so it must go through `remap` before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: PixelRect,
    /// In-plane rotation, degrees.
    #[serde(default)]
    pub roll_angle: f64,
    /// Left-right head turn, degrees. Absent on some frames.
    #[serde(default)]
    pub yaw_angle: Option<f64>,
    /// Up-down head tilt, degrees. Absent on some frames.
    #[serde(default)]
    pub pitch_angle: Option<f64>,
}

/// A detected face whose bounds have been corrected into upright
/// logical-frame unit space. Canonical internal representation: valid
/// at any target resolution, independent of which sensor produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemappedFace {
    pub bounds: UnitRect,
    pub roll_angle: f64,
    pub yaw_angle: f64,
    pub pitch_angle: f64,
}
