//! One-shot photo capture: freeze faces, shoot, composite, save.
//!
//! A capture is strictly sequential (`Capturing -> Decoding ->
//! Compositing -> Encoding -> Done | Failed`) and at most one is in
//! flight: overlapping requests are rejected, not queued, which keeps
//! the frozen-faces snapshot trivially race-free. The compositor runs
//! on the blocking pool so a large photo never stalls the runtime.

use std::sync::Arc;

use spriteon_compose::{ComposeError, ComposeStage, Compositor};
use spriteon_core::FrameGeometry;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::mailbox::{mailbox, FaceSnapshot, Publisher, Viewer};
use crate::traits::{GallerySink, PhotoCapture, SaveError, ShutterError};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("a capture is already in flight")]
    Busy,
    #[error(transparent)]
    Shutter(#[from] ShutterError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("composite task failed: {0}")]
    Internal(String),
}

/// Externally observable capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Idle,
    Capturing,
    Decoding,
    Compositing,
    Encoding,
    Done,
    Failed,
}

impl From<ComposeStage> for CaptureStage {
    fn from(stage: ComposeStage) -> Self {
        match stage {
            ComposeStage::Decoding => CaptureStage::Decoding,
            ComposeStage::Compositing { .. } => CaptureStage::Compositing,
            ComposeStage::Encoding => CaptureStage::Encoding,
        }
    }
}

/// Result of a completed capture.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Gallery reference for the saved image.
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub faces_composited: usize,
    /// Which detection frame the composited faces were frozen from.
    pub frame_seq: u64,
}

struct Devices<C, G> {
    camera: C,
    gallery: G,
}

struct Inner<C, G> {
    devices: Mutex<Devices<C, G>>,
    compositor: Compositor,
    geometry: FrameGeometry,
    faces: Viewer<FaceSnapshot>,
    stage: Arc<Publisher<CaptureStage>>,
    stage_view: Viewer<CaptureStage>,
}

/// Clone-safe handle driving one-shot captures.
pub struct CaptureController<C, G> {
    inner: Arc<Inner<C, G>>,
}

impl<C, G> Clone for CaptureController<C, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, G> CaptureController<C, G>
where
    C: PhotoCapture + Send + 'static,
    G: GallerySink + Send + 'static,
{
    pub fn new(
        camera: C,
        gallery: G,
        compositor: Compositor,
        geometry: FrameGeometry,
        faces: Viewer<FaceSnapshot>,
    ) -> Self {
        let (stage, stage_view) = mailbox(CaptureStage::Idle);
        Self {
            inner: Arc::new(Inner {
                devices: Mutex::new(Devices { camera, gallery }),
                compositor,
                geometry,
                faces,
                stage: Arc::new(stage),
                stage_view,
            }),
        }
    }

    /// Latest-wins view of the capture state, for UI feedback.
    pub fn stage(&self) -> Viewer<CaptureStage> {
        self.inner.stage_view.clone()
    }

    /// Run one capture with the given sprite image bytes.
    ///
    /// The face set is frozen from the live mailbox at the moment this
    /// is called — not when the photo arrives — so the composite shows
    /// exactly what the user saw at shutter press. Fails with
    /// [`CaptureError::Busy`] while another capture is in flight; any
    /// stage failure aborts the capture with no partial output.
    pub async fn capture(&self, sprite: Vec<u8>) -> Result<CaptureOutcome, CaptureError> {
        let Ok(mut devices) = self.inner.devices.try_lock() else {
            tracing::warn!("capture rejected: already in flight");
            return Err(CaptureError::Busy);
        };

        let result = self.run(&mut devices, sprite).await;
        match &result {
            Ok(outcome) => {
                self.inner.stage.post(CaptureStage::Done);
                tracing::info!(
                    uri = %outcome.uri,
                    faces = outcome.faces_composited,
                    frame_seq = outcome.frame_seq,
                    "capture complete"
                );
            }
            Err(err) => {
                self.inner.stage.post(CaptureStage::Failed);
                tracing::error!(error = %err, "capture failed");
            }
        }
        result
    }

    async fn run(
        &self,
        devices: &mut Devices<C, G>,
        sprite: Vec<u8>,
    ) -> Result<CaptureOutcome, CaptureError> {
        let frozen = self.inner.faces.latest();
        tracing::info!(
            frame_seq = frozen.frame_seq,
            faces = frozen.faces.len(),
            "shutter pressed; faces frozen"
        );

        self.inner.stage.post(CaptureStage::Capturing);
        let photo = devices.camera.capture().await?;

        let compositor = self.inner.compositor.clone();
        let geometry = self.inner.geometry;
        let stage = Arc::clone(&self.inner.stage);
        let composed = tokio::task::spawn_blocking(move || {
            compositor.compose_with_progress(
                &photo.data,
                &sprite,
                &geometry,
                &frozen.faces,
                |s| stage.post(s.into()),
            )
        })
        .await
        .map_err(|e| CaptureError::Internal(e.to_string()))??;

        let (width, height, faces_composited) =
            (composed.width, composed.height, composed.faces_composited);
        let saved = devices.gallery.save(composed.data).await?;

        Ok(CaptureOutcome {
            uri: saved.uri,
            width,
            height,
            faces_composited,
            frame_seq: frozen.frame_seq,
        })
    }
}
