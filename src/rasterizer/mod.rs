//! GBA-style software 3D renderer
//!
//! The whole pipeline runs on the CPU in fixed-point arithmetic:
//! - Model-space geometry into camera space (scale, rotate, translate, view)
//! - Backface culling and whole-triangle near/far rejection
//! - Perspective projection to integer screen coordinates
//! - Painter's-algorithm depth sort (no z-buffer)
//! - DDA scanline fill into a packed 15-bit framebuffer

mod camera;
mod fixed;
mod math;
mod pool;
mod render;
mod types;

pub use camera::*;
pub use fixed::*;
pub use math::*;
pub use pool::*;
pub use render::*;
pub use types::*;

/// Default canvas dimensions (scaled bitmap mode).
pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 128;

/// Ceiling on vertices per model.
pub const MAX_MODEL_VERTS: usize = 256;
/// Ceiling on faces per model.
pub const MAX_MODEL_FACES: usize = 512;
/// Hard cap on simultaneously visible screen-space triangles per frame.
/// Scenes must be budgeted to stay under it; overflowing is fatal.
pub const MAX_FRAME_TRIANGLES: usize = 256;
