//! spriteon-compose — Rasterizes face-tracked sprites onto captured photos.
//!
//! Re-derives the live overlay's projection at photo resolution from
//! the unit-space faces frozen at shutter time, draws the sprite
//! through a perspective transform, and re-encodes the result. Shares
//! all geometry with the live path via `spriteon-core`.

pub mod canvas;
pub mod compositor;

pub use canvas::Canvas;
pub use compositor::{ComposeError, ComposeStage, ComposedPhoto, Compositor};
