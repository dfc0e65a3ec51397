//! Live detection session: frames in, face snapshots out.
//!
//! Runs detect -> remap -> publish on its own task. The task is the
//! detection context; the mailbox post is the only synchronization
//! with the render side. Dropping the session aborts the task, so no
//! detection result is ever published after teardown.

use spriteon_core::{remap_faces, FrameGeometry};
use tokio::task::JoinHandle;

use crate::mailbox::{FaceSnapshot, Publisher, Viewer};
use crate::traits::{CameraFrame, FaceDetector, FrameSource};

/// [`FrameSource`] backed by a latest-wins [`mailbox`](crate::mailbox)
/// viewer. The slot holds `None` until the first frame arrives; the
/// feed ends when the publishing side is dropped.
pub struct MailboxFrames {
    viewer: Viewer<Option<CameraFrame>>,
    geometry: FrameGeometry,
}

impl MailboxFrames {
    pub fn new(viewer: Viewer<Option<CameraFrame>>, geometry: FrameGeometry) -> Self {
        Self { viewer, geometry }
    }
}

impl FrameSource for MailboxFrames {
    fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    async fn next_frame(&mut self) -> Option<CameraFrame> {
        loop {
            match self.viewer.updated().await {
                Some(Some(frame)) => return Some(frame),
                Some(None) => continue,
                None => return None,
            }
        }
    }
}

/// Handle to the running detection loop. Scoped: the loop cannot
/// outlive the handle.
pub struct LiveSession {
    // Option so `join` can take the handle out despite the Drop impl.
    handle: Option<JoinHandle<()>>,
}

impl LiveSession {
    /// Spawn the detection loop.
    ///
    /// `source` is a latest-wins view of the camera feed, so the loop
    /// naturally skips frames that arrive while a detection is in
    /// flight. A failed detection logs and publishes zero faces for
    /// that frame — it never ends the session.
    pub fn spawn<S, D>(mut source: S, mut detector: D, faces_out: Publisher<FaceSnapshot>) -> Self
    where
        S: FrameSource + Send + 'static,
        D: FaceDetector + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let geometry = source.geometry();
            tracing::info!(?geometry, "detection session started");

            while let Some(frame) = source.next_frame().await {
                let raw = match detector.detect(&frame) {
                    Ok(faces) => faces,
                    Err(err) => {
                        tracing::warn!(
                            sequence = frame.sequence,
                            error = %err,
                            "detection failed; treating frame as empty"
                        );
                        Vec::new()
                    }
                };

                let remapped = remap_faces(&raw, &geometry);
                tracing::trace!(
                    sequence = frame.sequence,
                    detected = raw.len(),
                    remapped = remapped.len(),
                    "frame processed"
                );
                faces_out.post(FaceSnapshot::new(frame.sequence, remapped));
            }

            tracing::info!("frame source closed; detection session ending");
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Abort the loop. It is cancelled at its next await point, so
    /// frames posted after this are never processed.
    pub fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Wait for the loop to end on its own (frame source closed).
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::mailbox;
    use crate::traits::DetectorError;
    use spriteon_core::{
        CameraPosition, DetectedFace, PixelRect, Platform, SensorOrientation,
    };
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn geometry() -> FrameGeometry {
        FrameGeometry {
            frame_width: 720.0,
            frame_height: 1280.0,
            sensor_orientation: SensorOrientation::Portrait,
            position: CameraPosition::Front,
            platform: Platform::Android,
        }
    }

    fn frame(sequence: u64) -> CameraFrame {
        CameraFrame {
            data: Arc::from(vec![0u8; 4].into_boxed_slice()),
            width: 720,
            height: 1280,
            sequence,
            timestamp: Instant::now(),
        }
    }

    /// Detector scripted per frame sequence: frames divisible by 5
    /// fail, everything else yields one face.
    struct ScriptedDetector;

    impl FaceDetector for ScriptedDetector {
        fn detect(&mut self, frame: &CameraFrame) -> Result<Vec<DetectedFace>, DetectorError> {
            if frame.sequence % 5 == 0 {
                return Err(DetectorError("model hiccup".into()));
            }
            Ok(vec![DetectedFace {
                bounds: PixelRect {
                    x: 100.0,
                    y: 100.0,
                    width: 50.0,
                    height: 60.0,
                },
                roll_angle: 0.0,
                yaw_angle: None,
                pitch_angle: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_mailbox_frames_expose_geometry_and_skip_to_latest() {
        let (frame_tx, frame_rx) = mailbox(None);
        let mut source = MailboxFrames::new(frame_rx, geometry());

        assert_eq!(source.geometry(), geometry());

        // Two frames posted before the consumer looks: only the newer
        // one is seen.
        frame_tx.post(Some(frame(1)));
        frame_tx.post(Some(frame(2)));
        let seen = source.next_frame().await.unwrap();
        assert_eq!(seen.sequence, 2);

        drop(frame_tx);
        assert!(source.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_frames_produce_face_snapshots() {
        let (frame_tx, frame_rx) = mailbox(None);
        let (face_tx, mut face_rx) = mailbox(FaceSnapshot::default());

        let source = MailboxFrames::new(frame_rx, geometry());
        let session = LiveSession::spawn(source, ScriptedDetector, face_tx);

        frame_tx.post(Some(frame(1)));
        let snap = face_rx.updated().await.unwrap();
        assert_eq!(snap.frame_seq, 1);
        assert_eq!(snap.faces.len(), 1);

        session.stop();
    }

    #[tokio::test]
    async fn test_detector_failure_publishes_empty_frame() {
        let (frame_tx, frame_rx) = mailbox(None);
        let (face_tx, mut face_rx) = mailbox(FaceSnapshot::default());

        let source = MailboxFrames::new(frame_rx, geometry());
        let session = LiveSession::spawn(source, ScriptedDetector, face_tx);

        frame_tx.post(Some(frame(5)));
        let snap = face_rx.updated().await.unwrap();
        assert_eq!(snap.frame_seq, 5);
        assert!(snap.faces.is_empty());

        // The session survives the failure.
        frame_tx.post(Some(frame(6)));
        let snap = face_rx.updated().await.unwrap();
        assert_eq!(snap.frame_seq, 6);
        assert_eq!(snap.faces.len(), 1);

        session.stop();
    }

    #[tokio::test]
    async fn test_session_ends_when_source_closes() {
        let (frame_tx, frame_rx) = mailbox(None);
        let (face_tx, _face_rx) = mailbox(FaceSnapshot::default());

        let source = MailboxFrames::new(frame_rx, geometry());
        let session = LiveSession::spawn(source, ScriptedDetector, face_tx);
        drop(frame_tx);
        session.join().await;
    }

    #[tokio::test]
    async fn test_no_publish_after_stop() {
        let (frame_tx, frame_rx) = mailbox(None);
        let (face_tx, mut face_rx) = mailbox(FaceSnapshot::default());

        let source = MailboxFrames::new(frame_rx, geometry());
        let session = LiveSession::spawn(source, ScriptedDetector, face_tx);
        frame_tx.post(Some(frame(1)));
        assert_eq!(face_rx.updated().await.unwrap().frame_seq, 1);

        session.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        frame_tx.post(Some(frame(2)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        // No snapshot for frame 2; the latest is still frame 1.
        assert_eq!(face_rx.latest().frame_seq, 1);
    }
}
