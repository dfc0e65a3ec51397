//! Single-slot latest-wins mailbox.
//!
//! The hand-off between the detection context and the overlay/capture
//! readers is a capacity-1 slot: posting never blocks and never queues,
//! a slow reader only ever skips stale values, and a read is one atomic
//! snapshot — a reader can never observe half of one frame's faces and
//! half of another's. Built on `tokio::sync::watch`, which is exactly
//! this primitive.

use std::sync::Arc;

use spriteon_core::RemappedFace;
use tokio::sync::watch;

/// The faces of one processed frame, published as a unit.
#[derive(Debug, Clone, Default)]
pub struct FaceSnapshot {
    /// Sequence number of the frame these faces came from.
    pub frame_seq: u64,
    pub faces: Arc<[RemappedFace]>,
}

impl FaceSnapshot {
    pub fn new(frame_seq: u64, faces: Vec<RemappedFace>) -> Self {
        Self {
            frame_seq,
            faces: faces.into(),
        }
    }
}

/// Create a connected publisher/viewer pair seeded with `initial`.
/// Viewers are cheap to clone; every viewer sees the same latest value.
pub fn mailbox<T: Clone>(initial: T) -> (Publisher<T>, Viewer<T>) {
    let (tx, rx) = watch::channel(initial);
    (Publisher { tx }, Viewer { rx })
}

/// Writing half. Posting replaces the slot unconditionally.
pub struct Publisher<T> {
    tx: watch::Sender<T>,
}

impl<T> Publisher<T> {
    /// Fire-and-forget post: never blocks, never queues. A value nobody
    /// reads before the next post is simply superseded.
    pub fn post(&self, value: T) {
        // Send only fails with no receivers, which just means nothing
        // is rendering right now; the value is still latest-wins moot.
        let _ = self.tx.send(value);
    }
}

/// Reading half.
#[derive(Clone)]
pub struct Viewer<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Viewer<T> {
    /// Atomic snapshot of the latest posted value.
    pub fn latest(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next post and return it. Returns `None` once the
    /// publisher is gone and no unseen value remains.
    pub async fn updated(&mut self) -> Option<T> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}
