//! RGBA raster canvas with a save/restore transform stack.
//!
//! The minimal 2D drawing surface the compositor needs: a base image,
//! a stack of homogeneous transforms, and perspective-correct image
//! drawing via inverse mapping with bilinear sampling. Destination
//! pixels are alpha-over blended, straight (non-premultiplied) alpha.

use image::{DynamicImage, Rgba, RgbaImage};
use spriteon_core::{Mat3, Point};
use thiserror::Error;

/// Largest surface we will allocate, in pixels (512 MiB of RGBA).
const MAX_SURFACE_PIXELS: u64 = 1 << 27;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("cannot allocate {width}x{height} drawing surface")]
    SurfaceCreation { width: u32, height: u32 },
}

/// Drawing surface plus transform state.
pub struct Canvas {
    pixels: RgbaImage,
    transform: Mat3,
    stack: Vec<Mat3>,
}

impl Canvas {
    /// Allocate a transparent surface. Fails for zero-sized or
    /// implausibly large dimensions rather than aborting on OOM.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 || (width as u64) * (height as u64) > MAX_SURFACE_PIXELS {
            return Err(CanvasError::SurfaceCreation { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
            transform: Mat3::IDENTITY,
            stack: Vec::new(),
        })
    }

    /// Create a canvas whose base layer is the given image.
    pub fn from_image(image: &DynamicImage) -> Result<Self, CanvasError> {
        let mut canvas = Self::new(image.width(), image.height())?;
        canvas.pixels = image.to_rgba8();
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Push the current transform.
    pub fn save(&mut self) {
        self.stack.push(self.transform);
    }

    /// Pop the most recently saved transform. Restoring past the bottom
    /// of the stack resets to identity.
    pub fn restore(&mut self) {
        self.transform = self.stack.pop().unwrap_or(Mat3::IDENTITY);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.concat(&Mat3::translate(tx, ty));
    }

    pub fn rotate_deg(&mut self, angle_deg: f64) {
        self.concat(&Mat3::rotate_deg(angle_deg));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.concat(&Mat3::scale(sx, sy));
    }

    /// Post-multiply the current transform, Canvas2D style: the new
    /// operation applies to local coordinates first.
    pub fn concat(&mut self, m: &Mat3) {
        self.transform = self.transform.mul(m);
    }

    /// Draw `sprite` into the local-space rectangle
    /// `(dest_x, dest_y, dest_w, dest_h)` under the current transform.
    ///
    /// Inverse-maps each covered destination pixel back through the
    /// transform, bilinear-samples the sprite, and alpha-over blends.
    /// A degenerate (non-invertible) transform draws nothing.
    pub fn draw_image_rect(
        &mut self,
        sprite: &RgbaImage,
        dest_x: f64,
        dest_y: f64,
        dest_w: f64,
        dest_h: f64,
    ) {
        if dest_w <= 0.0 || dest_h <= 0.0 || sprite.width() == 0 || sprite.height() == 0 {
            return;
        }
        let Some(inverse) = self.transform.invert() else {
            tracing::debug!("skipping draw through degenerate transform");
            return;
        };

        // Bounding box of the transformed destination quad, clipped to
        // the surface. A corner past the perspective horizon comes back
        // non-finite; skip the draw rather than rasterize garbage.
        let corners = [
            Point::new(dest_x, dest_y),
            Point::new(dest_x + dest_w, dest_y),
            Point::new(dest_x, dest_y + dest_h),
            Point::new(dest_x + dest_w, dest_y + dest_h),
        ]
        .map(|c| self.transform.apply(c));

        if corners.iter().any(|c| !c.is_finite()) {
            tracing::debug!("skipping draw with non-finite projected corners");
            return;
        }

        let min_x = corners.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().min(self.pixels.width() as f64 - 1.0)).max(0.0) as u32;
        let y1 = (max_y.ceil().min(self.pixels.height() as f64 - 1.0)).max(0.0) as u32;
        if x0 > x1 || y0 > y1 {
            return;
        }

        let scale_u = sprite.width() as f64 / dest_w;
        let scale_v = sprite.height() as f64 / dest_h;

        for py in y0..=y1 {
            for px in x0..=x1 {
                // Sample at the pixel center.
                let local = inverse.apply(Point::new(px as f64 + 0.5, py as f64 + 0.5));
                if !local.is_finite() {
                    continue;
                }
                let u = (local.x - dest_x) * scale_u;
                let v = (local.y - dest_y) * scale_v;
                if u < 0.0 || v < 0.0 || u >= sprite.width() as f64 || v >= sprite.height() as f64
                {
                    continue;
                }

                let src = sample_bilinear(sprite, u - 0.5, v - 0.5);
                if src[3] == 0 {
                    continue;
                }
                let dst = self.pixels.get_pixel_mut(px, py);
                *dst = blend_over(src, *dst);
            }
        }
    }

    /// Consume the canvas, returning the flattened pixels.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

/// Bilinear RGBA sample with edge clamping.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let w = image.width() as i64;
    let h = image.height() as i64;

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let clamp_px = |cx: i64, cy: i64| -> &Rgba<u8> {
        let cx = cx.clamp(0, w - 1) as u32;
        let cy = cy.clamp(0, h - 1) as u32;
        image.get_pixel(cx, cy)
    };

    let tl = clamp_px(x0, y0);
    let tr = clamp_px(x0 + 1, y0);
    let bl = clamp_px(x0, y0 + 1);
    let br = clamp_px(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let top = tl.0[i] as f64 * (1.0 - fx) + tr.0[i] as f64 * fx;
        let bot = bl.0[i] as f64 * (1.0 - fx) + br.0[i] as f64 * fx;
        *slot = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Straight-alpha source-over blend.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as f64 / 255.0;
    let da = dst.0[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src.0[i] as f64 * sa + dst.0[i] as f64 * da * (1.0 - sa)) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}
