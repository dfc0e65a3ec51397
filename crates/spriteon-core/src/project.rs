//! Sprite placement over a detected face.
//!
//! Turns one [`RemappedFace`] plus a render target's pixel dimensions
//! into a renderable placement. The same projection runs per frame
//! against the live preview and once per face against the captured
//! photo — only the target dimensions differ.

use serde::{Deserialize, Serialize};

use crate::space::{length_to_pixel, to_pixel_point};
use crate::types::{Point, RemappedFace};

// Product-tuned constants. Their values are empirical (chosen by eye on
// device); changing them changes product behavior, not correctness.

/// Sprite size as a fraction of the opposite face axis. Cross-dimension
/// on purpose: keeps sprite proportions visually stable as the face
/// rotates.
const SPRITE_SCALE_FACTOR: f64 = 0.25;
/// Vertical anchor as a fraction of face height, applied upward so the
/// sprite sits on the forehead rather than covering the face.
const FOREHEAD_OFFSET_FACTOR: f64 = 0.35;
/// Perspective distance for the yaw/pitch foreshortening.
const PERSPECTIVE_DISTANCE: f64 = 300.0;
/// Yaw/pitch are clamped to this magnitude to avoid degenerate skew.
const POSE_CLAMP_DEG: f64 = 60.0;
/// Final uniform scale compensating for the cross-dimension sizing.
const OVERLAY_SCALE: f64 = 2.0;

/// Tunable projection constants, defaulting to the product values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Sprite width = `sprite_scale_factor` x face height (and height
    /// = factor x face width).
    pub sprite_scale_factor: f64,
    /// Upward anchor offset = `forehead_offset_factor` x face height.
    pub forehead_offset_factor: f64,
    pub perspective_distance: f64,
    pub pose_clamp_deg: f64,
    pub overlay_scale: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sprite_scale_factor: SPRITE_SCALE_FACTOR,
            forehead_offset_factor: FOREHEAD_OFFSET_FACTOR,
            perspective_distance: PERSPECTIVE_DISTANCE,
            pose_clamp_deg: POSE_CLAMP_DEG,
            overlay_scale: OVERLAY_SCALE,
        }
    }
}

impl Tuning {
    /// Load tuning from `SPRITEON_*` environment variables, falling
    /// back to the product defaults for anything unset.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            sprite_scale_factor: env_f64("SPRITEON_SPRITE_SCALE", d.sprite_scale_factor),
            forehead_offset_factor: env_f64("SPRITEON_FOREHEAD_OFFSET", d.forehead_offset_factor),
            perspective_distance: env_f64("SPRITEON_PERSPECTIVE", d.perspective_distance),
            pose_clamp_deg: env_f64("SPRITEON_POSE_CLAMP_DEG", d.pose_clamp_deg),
            overlay_scale: env_f64("SPRITEON_OVERLAY_SCALE", d.overlay_scale),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Everything needed to render one sprite over one face, in target
/// pixels. The transform sequence is fixed: translate to `center`,
/// rotate by `roll_deg`, perspective yaw then pitch, translate by
/// `forehead_offset`, scale — in that order, composed around the
/// already-centered origin. See [`SpritePlacement::matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpritePlacement {
    /// Face center in target pixels (after any horizontal mirror).
    pub center: Point,
    pub sprite_width: f64,
    pub sprite_height: f64,
    /// In-plane rotation, degrees, unclamped.
    pub roll_deg: f64,
    /// Head turn, degrees, clamped to the pose limit.
    pub yaw_deg: f64,
    /// Head tilt, degrees, clamped to the pose limit.
    pub pitch_deg: f64,
    /// Vertical anchor offset in target pixels, negative = upward.
    pub forehead_offset: f64,
    pub perspective_distance: f64,
    pub scale: f64,
}

/// Project a remapped face onto a `target_w` x `target_h` render
/// target. `mirror_x` compensates for a mirrored preview (see
/// [`crate::types::FrameGeometry::mirrors_x`]): the unit-space x is
/// negated before conversion.
pub fn project(
    face: &RemappedFace,
    target_w: f64,
    target_h: f64,
    mirror_x: bool,
    tuning: &Tuning,
) -> SpritePlacement {
    let unit_x = if mirror_x {
        -face.bounds.x
    } else {
        face.bounds.x
    };

    let top_left = to_pixel_point(unit_x, face.bounds.y, target_w, target_h);
    let face_width = length_to_pixel(face.bounds.width, target_w);
    let face_height = length_to_pixel(face.bounds.height, target_h);

    let center = Point {
        x: top_left.x + face_width / 2.0,
        y: top_left.y + face_height / 2.0,
    };

    let clamp = tuning.pose_clamp_deg;

    SpritePlacement {
        center,
        sprite_width: face_height * tuning.sprite_scale_factor,
        sprite_height: face_width * tuning.sprite_scale_factor,
        roll_deg: face.roll_angle,
        yaw_deg: face.yaw_angle.clamp(-clamp, clamp),
        pitch_deg: face.pitch_angle.clamp(-clamp, clamp),
        forehead_offset: -face_height * tuning.forehead_offset_factor,
        perspective_distance: tuning.perspective_distance,
        scale: tuning.overlay_scale,
    }
}
