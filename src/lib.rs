//! # Pinselflut
//!
//! A drawing client for pixelflut canvas servers. Strokes are rasterized
//! with a soft round brush, encoded as `PX x y rrggbbaa` lines and streamed
//! over a non-blocking TCP connection that reconnects on its own. A local
//! mirror of everything sent is kept for the terminal display.

pub mod canvas;
pub mod client;
pub mod config;
pub mod errors;
pub mod net;
pub mod tui;

pub use client::{ClientStats, FlutClient};
pub use config::{load_config, save_config, Config};
pub use errors::{PinselError, Result};
