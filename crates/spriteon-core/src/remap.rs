//! Raw detector box -> upright unit-space remapping.
//!
//! A camera sensor's native pixel axes do not always match the upright,
//! user-perceived frame, and iOS and Android report the rotation
//! differently. All of that interpretation lives here; everything
//! downstream (overlay, compositor) only ever sees [`RemappedFace`].

use crate::space::{length_to_unit, to_unit_point};
use crate::types::{DetectedFace, FrameGeometry, Platform, RemappedFace, UnitRect};

/// Remap a raw detected face into upright logical-frame unit space.
///
/// Returns `None` when the result is non-finite (degenerate geometry,
/// e.g. a zero-sized frame); such a face is dropped for the frame
/// rather than letting NaN reach rendering.
pub fn remap_face(face: &DetectedFace, geometry: &FrameGeometry) -> Option<RemappedFace> {
    let (logical_w, logical_h) = geometry.logical_size();

    let (top_left_x, top_left_y) = if geometry.swaps_axes() {
        // The raw origin is measured from the frame's top-right in
        // sensor order; reconstruct the upright top-left corner. The
        // two platforms disagree about which raw field is the edge
        // distance: the iOS detector reports `y` from the far edge of
        // the box, so its height must be added back; Android boxes
        // arrive pre-mirrored and only need the axis transpose.
        match geometry.platform {
            Platform::Ios => (face.bounds.y + face.bounds.height, face.bounds.x),
            Platform::Android => (face.bounds.y, face.bounds.x),
        }
    } else {
        (face.bounds.x, face.bounds.y)
    };

    let top_left = to_unit_point(top_left_x, top_left_y, logical_w, logical_h);

    let bounds = UnitRect {
        x: top_left.x,
        y: top_left.y,
        width: length_to_unit(face.bounds.width, logical_w),
        height: length_to_unit(face.bounds.height, logical_h),
    };

    if !bounds.is_finite() {
        tracing::warn!(?bounds, ?geometry, "dropping face with non-finite remap");
        return None;
    }

    Some(RemappedFace {
        bounds,
        roll_angle: face.roll_angle,
        // Some frames arrive without pose angles; treat missing as 0.
        yaw_angle: face.yaw_angle.unwrap_or(0.0),
        pitch_angle: face.pitch_angle.unwrap_or(0.0),
    })
}

/// Remap every face the detector reported. There is no confidence
/// filtering; only non-finite results are dropped.
pub fn remap_faces(faces: &[DetectedFace], geometry: &FrameGeometry) -> Vec<RemappedFace> {
    faces
        .iter()
        .filter_map(|face| remap_face(face, geometry))
        .collect()
}
