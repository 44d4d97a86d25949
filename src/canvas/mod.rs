//! # Canvas - local drawing engine
//!
//! Everything that decides which pixels a gesture touches and keeps the
//! local mirror of the remote canvas:
//!
//! ```text
//!   pointer samples ──► Stabilizer ──► stamp_line / stamp_point ──► PixelSink
//!                                                                    │
//!                                        FillJob::fill_step ────────►│
//!                                                                    ▼
//!                                                   Framebuffer (+ wire encoder)
//! ```

mod brush;
mod color;
mod fill;
mod framebuffer;
mod rasterizer;
mod stabilizer;

pub use brush::{Brush, BrushCurve, Channel, COLOR_STEP, MAX_SIZE, MAX_STABILIZATION, MIN_SIZE};
pub use color::{Rgb, Rgba};
pub use fill::FillJob;
pub use framebuffer::{Dimensions, Framebuffer};
pub use rasterizer::{stamp_line, stamp_point, PixelSink, Tip};
pub use stabilizer::{Segment, Stabilizer};
