//! Photo compositing: frozen faces + sprite + captured photo -> one
//! flattened JPEG.
//!
//! Runs the exact projection the live overlay computed, but against the
//! photo's pixel dimensions — faces are stored in unit space precisely
//! so the same normalized box is valid at any target resolution.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::canvas::{Canvas, CanvasError};
use spriteon_core::{project, FrameGeometry, RemappedFace, Tuning};

/// JPEG quality for the flattened output.
const OUTPUT_JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("failed to decode captured photo: {0}")]
    DecodePhoto(String),
    #[error("failed to decode sprite image: {0}")]
    DecodeSprite(String),
    #[error(transparent)]
    Surface(#[from] CanvasError),
    #[error("failed to encode composited photo: {0}")]
    Encode(String),
}

/// Stages of a composite, reported through the progress callback so
/// callers can track the capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeStage {
    Decoding,
    /// Drawing face `index` of `total`.
    Compositing { index: usize, total: usize },
    Encoding,
}

/// A finished composite.
#[derive(Debug, Clone)]
pub struct ComposedPhoto {
    /// JPEG bytes of the flattened image.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// How many sprites were drawn (0 means the photo was only
    /// re-encoded).
    pub faces_composited: usize,
}

/// Stateless compositor configured with projection tuning.
#[derive(Debug, Clone)]
pub struct Compositor {
    tuning: Tuning,
}

impl Compositor {
    pub fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Composite `faces` onto `photo_bytes` using `sprite_bytes`.
    ///
    /// `geometry` is the capture session's camera context; only its
    /// mirroring rule applies here — the projection itself runs against
    /// the decoded photo's own dimensions. An empty face list succeeds
    /// and returns a plain re-encode of the photo. Any failure aborts
    /// the whole composite; there is no partial output.
    pub fn compose(
        &self,
        photo_bytes: &[u8],
        sprite_bytes: &[u8],
        geometry: &FrameGeometry,
        faces: &[RemappedFace],
    ) -> Result<ComposedPhoto, ComposeError> {
        self.compose_with_progress(photo_bytes, sprite_bytes, geometry, faces, |_| {})
    }

    /// [`compose`](Self::compose) with a stage callback, used by the
    /// capture pipeline to surface its state machine.
    pub fn compose_with_progress(
        &self,
        photo_bytes: &[u8],
        sprite_bytes: &[u8],
        geometry: &FrameGeometry,
        faces: &[RemappedFace],
        mut on_stage: impl FnMut(ComposeStage),
    ) -> Result<ComposedPhoto, ComposeError> {
        on_stage(ComposeStage::Decoding);

        let photo = image::load_from_memory(photo_bytes)
            .map_err(|e| ComposeError::DecodePhoto(e.to_string()))?;
        let sprite = image::load_from_memory(sprite_bytes)
            .map_err(|e| ComposeError::DecodeSprite(e.to_string()))?
            .to_rgba8();

        let (photo_w, photo_h) = (photo.width(), photo.height());
        tracing::debug!(
            width = photo_w,
            height = photo_h,
            faces = faces.len(),
            "compositing photo"
        );

        let mut canvas = Canvas::from_image(&photo)?;
        let mirror_x = geometry.mirrors_x();

        for (index, face) in faces.iter().enumerate() {
            on_stage(ComposeStage::Compositing {
                index,
                total: faces.len(),
            });

            let placement = project(face, photo_w as f64, photo_h as f64, mirror_x, &self.tuning);
            tracing::trace!(index, ?placement, "drawing sprite");

            canvas.save();
            canvas.concat(&placement.matrix());
            canvas.draw_image_rect(
                &sprite,
                -placement.sprite_width / 2.0,
                -placement.sprite_height / 2.0,
                placement.sprite_width,
                placement.sprite_height,
            );
            canvas.restore();
        }

        on_stage(ComposeStage::Encoding);
        let flattened = DynamicImage::ImageRgba8(canvas.into_image()).to_rgb8();

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut data), OUTPUT_JPEG_QUALITY)
            .write_image(
                flattened.as_raw(),
                photo_w,
                photo_h,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| ComposeError::Encode(e.to_string()))?;

        Ok(ComposedPhoto {
            data,
            width: photo_w,
            height: photo_h,
            faces_composited: faces.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use spriteon_core::{CameraPosition, Platform, SensorOrientation, UnitRect};

    fn png_bytes_rgb(image: RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn png_bytes_rgba(image: RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn geometry() -> FrameGeometry {
        FrameGeometry {
            frame_width: 720.0,
            frame_height: 1280.0,
            sensor_orientation: SensorOrientation::Portrait,
            position: CameraPosition::Back,
            platform: Platform::Android,
        }
    }

    fn centered_face() -> RemappedFace {
        RemappedFace {
            bounds: UnitRect {
                x: -0.25,
                y: -0.25,
                width: 0.5,
                height: 0.5,
            },
            roll_angle: 0.0,
            yaw_angle: 0.0,
            pitch_angle: 0.0,
        }
    }

    #[test]
    fn test_zero_faces_reencodes_photo() {
        let photo = png_bytes_rgb(RgbImage::from_pixel(64, 64, Rgb([40, 90, 160])));
        let sprite = png_bytes_rgba(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));

        let out = Compositor::new(Tuning::default())
            .compose(&photo, &sprite, &geometry(), &[])
            .unwrap();

        assert_eq!(out.faces_composited, 0);
        assert_eq!((out.width, out.height), (64, 64));

        // Lossy re-encode, but the pixel content must survive within a
        // small perceptual tolerance on a flat image.
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgb8();
        let p = decoded.get_pixel(32, 32).0;
        assert!((p[0] as i32 - 40).abs() < 8, "r: {}", p[0]);
        assert!((p[1] as i32 - 90).abs() < 8, "g: {}", p[1]);
        assert!((p[2] as i32 - 160).abs() < 8, "b: {}", p[2]);
    }

    #[test]
    fn test_sprite_lands_above_face_center() {
        // Black 200x200 photo, centered face, neutral pose: the sprite
        // anchors at the center offset upward by 0.35 x face height.
        let photo = png_bytes_rgb(RgbImage::from_pixel(200, 200, Rgb([0, 0, 0])));
        let sprite = png_bytes_rgba(RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])));

        let out = Compositor::new(Tuning::default())
            .compose(&photo, &sprite, &geometry(), &[centered_face()])
            .unwrap();
        assert_eq!(out.faces_composited, 1);

        let decoded = image::load_from_memory(&out.data).unwrap().to_rgb8();

        // Face height = 0.5 * 200 / 2 = 50 px; anchor y = 100 - 17.5.
        let anchor = decoded.get_pixel(100, 82).0;
        assert!(anchor[0] > 180, "sprite red at anchor, got {anchor:?}");
        assert!(anchor[1] < 80 && anchor[2] < 80, "got {anchor:?}");

        // Far corner untouched (black survives JPEG).
        let corner = decoded.get_pixel(10, 190).0;
        assert!(corner[0] < 30 && corner[1] < 30 && corner[2] < 30, "got {corner:?}");
    }

    #[test]
    fn test_mirrored_front_ios_flips_sprite_x() {
        let photo = png_bytes_rgb(RgbImage::from_pixel(200, 200, Rgb([0, 0, 0])));
        let sprite = png_bytes_rgba(RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])));

        // Face pushed toward +x in unit space.
        let mut face = centered_face();
        face.bounds.x = 0.3;

        let mirrored_geometry = FrameGeometry {
            position: CameraPosition::Front,
            platform: Platform::Ios,
            ..geometry()
        };

        let out = Compositor::new(Tuning::default())
            .compose(&photo, &sprite, &mirrored_geometry, &[face])
            .unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgb8();

        // Unmirrored the sprite would sit right of center (x = 155);
        // the iOS front camera flips it to the left half.
        // top_left x = (-0.3 * 200)/2 + 100 = 70, center = 70 + 25 = 95.
        let left = decoded.get_pixel(95, 82).0;
        assert!(left[1] > 180, "expected sprite on mirrored side, got {left:?}");
        let right = decoded.get_pixel(155, 82).0;
        assert!(right[1] < 80, "expected no sprite on unmirrored side, got {right:?}");
    }

    #[test]
    fn test_bad_photo_bytes_fail_distinguishably() {
        let sprite = png_bytes_rgba(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let err = Compositor::new(Tuning::default())
            .compose(b"not an image", &sprite, &geometry(), &[])
            .unwrap_err();
        assert!(matches!(err, ComposeError::DecodePhoto(_)), "{err}");
    }

    #[test]
    fn test_bad_sprite_bytes_fail_distinguishably() {
        let photo = png_bytes_rgb(RgbImage::from_pixel(16, 16, Rgb([0, 0, 0])));
        let err = Compositor::new(Tuning::default())
            .compose(&photo, b"not an image", &geometry(), &[centered_face()])
            .unwrap_err();
        assert!(matches!(err, ComposeError::DecodeSprite(_)), "{err}");
    }

    #[test]
    fn test_stage_callback_order() {
        let photo = png_bytes_rgb(RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])));
        let sprite = png_bytes_rgba(RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));

        let mut stages = Vec::new();
        Compositor::new(Tuning::default())
            .compose_with_progress(
                &photo,
                &sprite,
                &geometry(),
                &[centered_face(), centered_face()],
                |s| stages.push(s),
            )
            .unwrap();

        assert_eq!(
            stages,
            vec![
                ComposeStage::Decoding,
                ComposeStage::Compositing { index: 0, total: 2 },
                ComposeStage::Compositing { index: 1, total: 2 },
                ComposeStage::Encoding,
            ]
        );
    }
}
