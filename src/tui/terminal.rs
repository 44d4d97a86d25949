//! Terminal setup and teardown
//!
//! Critical: includes a panic hook that restores the terminal on crash.

use std::io::{self, stdout, Write};
use std::panic;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::errors::{PinselError, Result};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Install panic hook that restores terminal before showing panic info.
/// Without this, a panic in raw mode leaves the terminal unusable.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = leave();
        original_hook(panic_info);
    }));
}

fn leave() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        stdout(),
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )
}

/// Initialize the terminal for drawing
///
/// - Installs custom panic hook
/// - Enables raw mode (no line buffering)
/// - Enters alternate screen (preserves scrollback)
/// - Enables mouse capture so drags reach the canvas
pub fn init() -> Result<Tui> {
    install_panic_hook();

    enable_raw_mode().map_err(PinselError::Terminal)?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, crossterm::cursor::Hide)
        .map_err(PinselError::Terminal)?;

    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend).map_err(PinselError::Terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    leave().map_err(PinselError::Terminal)
}

/// Set the terminal title
pub fn set_title(title: &str) {
    let mut stdout = stdout();
    // OSC 0 ; title ST - works in most terminals
    let _ = write!(stdout, "\x1b]0;{title}\x1b\\");
    let _ = stdout.flush();
}
