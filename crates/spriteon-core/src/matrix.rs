//! Homogeneous 3x3 transforms for sprite rasterization.
//!
//! The live overlay can hand [`SpritePlacement`](crate::SpritePlacement)
//! to a declarative view transform; the photo compositor instead needs
//! an explicit matrix it can invert and sample through. Yaw and pitch
//! are perspective-weighted projections of the out-of-plane rotations:
//! a point rotated about the vertical axis by theta lands at
//! `x' = x cos(theta)` with depth `x sin(theta)`, which a perspective
//! distance `d` turns into the projective factor `1 - x sin(theta)/d`.

use crate::project::SpritePlacement;
use crate::types::Point;

/// Row-major homogeneous 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub fn translate(tx: f64, ty: f64) -> Self {
        Mat3([[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]])
    }

    /// In-plane rotation, clockwise-positive in screen coordinates
    /// (consistent with [`crate::space::rotate_point`]).
    pub fn rotate_deg(angle_deg: f64) -> Self {
        let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
        Mat3([[cos_t, -sin_t, 0.0], [sin_t, cos_t, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Mat3([[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation about the vertical axis projected through perspective
    /// distance `d`: horizontal foreshortening plus a projective term.
    pub fn yaw_deg(angle_deg: f64, d: f64) -> Self {
        let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
        Mat3([
            [cos_t, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-sin_t / d, 0.0, 1.0],
        ])
    }

    /// Rotation about the horizontal axis projected through perspective
    /// distance `d`: vertical foreshortening plus a projective term.
    pub fn pitch_deg(angle_deg: f64, d: f64) -> Self {
        let (sin_t, cos_t) = angle_deg.to_radians().sin_cos();
        Mat3([
            [1.0, 0.0, 0.0],
            [0.0, cos_t, 0.0],
            [0.0, -sin_t / d, 1.0],
        ])
    }

    pub fn mul(&self, rhs: &Mat3) -> Mat3 {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Mat3(out)
    }

    /// Apply to a point with homogeneous divide. A point on the
    /// projective horizon divides by ~0 and comes back non-finite;
    /// callers must check [`Point::is_finite`] before using it.
    pub fn apply(&self, p: Point) -> Point {
        let m = &self.0;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        Point {
            x: x / w,
            y: y / w,
        }
    }

    /// Invert via the adjugate. Returns `None` for a degenerate matrix.
    pub fn invert(&self) -> Option<Mat3> {
        let m = &self.0;
        let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
        let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;

        Some(Mat3([
            [
                c00 * inv_det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
            ],
            [
                c01 * inv_det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
            ],
            [
                c02 * inv_det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
            ],
        ]))
    }
}

impl SpritePlacement {
    /// Full placement transform. Composed so that a local sprite point
    /// is scaled, anchored by the forehead offset, skewed by pitch then
    /// yaw, rolled, and finally translated to the face center — the
    /// sprite itself is drawn centered on the local origin
    /// (`[-w/2, -h/2, w, h]`). The order is load-bearing: the rotations
    /// must compose around the already-centered origin.
    pub fn matrix(&self) -> Mat3 {
        Mat3::translate(self.center.x, self.center.y)
            .mul(&Mat3::rotate_deg(self.roll_deg))
            .mul(&Mat3::yaw_deg(self.yaw_deg, self.perspective_distance))
            .mul(&Mat3::pitch_deg(self.pitch_deg, self.perspective_distance))
            .mul(&Mat3::translate(0.0, self.forehead_offset))
            .mul(&Mat3::scale(self.scale, self.scale))
    }
}
