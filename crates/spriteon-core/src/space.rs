//! Unit-space <-> pixel-space conversion primitives.
//!
//! Unit space is center-origin with each axis normalized to its own
//! frame dimension: the full frame spans [-1, 1] horizontally and
//! vertically regardless of aspect ratio. These four conversions plus
//! point rotation are the only math the remapper, projector, and
//! compositor need.

use crate::types::Point;

/// Convert a pixel-space point (top-left origin) to unit space for a
/// `ref_w` x `ref_h` frame.
pub fn to_unit_point(px: f64, py: f64, ref_w: f64, ref_h: f64) -> Point {
    let shifted_x = px - ref_w / 2.0;
    let shifted_y = py - ref_h / 2.0;
    Point {
        x: (shifted_x * 2.0) / ref_w,
        y: (shifted_y * 2.0) / ref_h,
    }
}

/// Convert a unit-space point back to pixel space. Exact inverse of
/// [`to_unit_point`].
pub fn to_pixel_point(ux: f64, uy: f64, ref_w: f64, ref_h: f64) -> Point {
    Point {
        x: (ux * ref_w) / 2.0 + ref_w / 2.0,
        y: (uy * ref_h) / 2.0 + ref_h / 2.0,
    }
}

/// Scale a pixel-space length to unit space. Lengths carry no
/// translation component, only the x2/dimension scale.
pub fn length_to_unit(len: f64, ref_dim: f64) -> f64 {
    (len * 2.0) / ref_dim
}

/// Scale a unit-space length back to pixels. Exact inverse of
/// [`length_to_unit`].
pub fn length_to_pixel(ulen: f64, ref_dim: f64) -> f64 {
    (ulen * ref_dim) / 2.0
}

/// Rotate `point` around `center` by `angle_deg`. Positive angles
/// rotate clockwise in screen coordinates (y grows downward).
pub fn rotate_point(point: Point, center: Point, angle_deg: f64) -> Point {
    let theta = angle_deg.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();

    let tx = point.x - center.x;
    let ty = point.y - center.y;

    Point {
        x: tx * cos_t - ty * sin_t + center.x,
        y: tx * sin_t + ty * cos_t + center.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_unit_point_frame_center() {
        let p = to_unit_point(360.0, 640.0, 720.0, 1280.0);
        assert!(p.x.abs() < EPS);
        assert!(p.y.abs() < EPS);
    }

    #[test]
    fn test_unit_point_corners() {
        let tl = to_unit_point(0.0, 0.0, 720.0, 1280.0);
        assert!((tl.x + 1.0).abs() < EPS);
        assert!((tl.y + 1.0).abs() < EPS);

        let br = to_unit_point(720.0, 1280.0, 720.0, 1280.0);
        assert!((br.x - 1.0).abs() < EPS);
        assert!((br.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_point_roundtrip() {
        let cases = [
            (0.0, 0.0, 720.0, 1280.0),
            (100.0, 50.0, 720.0, 1280.0),
            (719.0, 1279.0, 720.0, 1280.0),
            (13.37, 42.42, 1920.0, 1080.0),
            (-25.0, 2000.0, 640.0, 360.0), // out-of-frame points are valid too
        ];
        for (px, py, w, h) in cases {
            let u = to_unit_point(px, py, w, h);
            let p = to_pixel_point(u.x, u.y, w, h);
            assert!((p.x - px).abs() < EPS, "x: {} vs {}", p.x, px);
            assert!((p.y - py).abs() < EPS, "y: {} vs {}", p.y, py);
        }
    }

    #[test]
    fn test_length_roundtrip() {
        for (len, dim) in [(0.0, 720.0), (40.0, 720.0), (1280.0, 1280.0), (3.5, 100.0)] {
            let back = length_to_pixel(length_to_unit(len, dim), dim);
            assert!((back - len).abs() < EPS, "{back} vs {len}");
        }
    }

    #[test]
    fn test_length_full_frame_spans_two_units() {
        assert!((length_to_unit(720.0, 720.0) - 2.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_identity_zero() {
        let p = Point::new(10.0, 20.0);
        let c = Point::new(3.0, 4.0);
        let r = rotate_point(p, c, 0.0);
        assert!((r.x - p.x).abs() < EPS);
        assert!((r.y - p.y).abs() < EPS);
    }

    #[test]
    fn test_rotate_identity_full_turn() {
        let p = Point::new(-7.0, 12.5);
        let c = Point::new(1.0, -1.0);
        let r = rotate_point(p, c, 360.0);
        assert!((r.x - p.x).abs() < 1e-9);
        assert!((r.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_quarter_turn_clockwise() {
        // Screen coordinates: +90 deg sends +x to +y.
        let r = rotate_point(Point::new(1.0, 0.0), Point::new(0.0, 0.0), 90.0);
        assert!(r.x.abs() < EPS);
        assert!((r.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_about_offset_center() {
        let r = rotate_point(Point::new(5.0, 3.0), Point::new(4.0, 3.0), 180.0);
        assert!((r.x - 3.0).abs() < EPS);
        assert!((r.y - 3.0).abs() < EPS);
    }
}
