//! Terminal front-end
//!
//! Paints the canvas mirror with half blocks and turns mouse drags into
//! brush strokes. Only talks to the engine through [`FlutClient`], the
//! rasterizer and the stabilizer.
//!
//! - `app.rs` - Application state and event handling
//! - `terminal.rs` - Terminal setup/teardown
//! - `ui.rs` - Layout and status line
//! - `mirror_view.rs` - Half-block canvas widget

pub mod app;
pub mod mirror_view;
pub mod terminal;
pub mod ui;

pub use app::{App, Stroke};
pub use mirror_view::MirrorView;

use crate::client::FlutClient;
use crate::config::Config;
use crate::errors::Result;

/// Run the painting UI on a connected client
///
/// The terminal is restored even when the loop fails.
pub fn run(client: FlutClient, config: &Config) -> Result<()> {
    let mut terminal = terminal::init()?;
    let mut app = App::new(client, config);
    let result = app.run(&mut terminal);
    terminal::restore()?;
    result
}
