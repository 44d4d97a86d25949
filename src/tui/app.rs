//! Application state and main loop
//!
//! One cooperative loop: handle at most one input event per iteration, or,
//! when idle, do one bounded piece of background work (a fill row or a
//! keep-alive) and redraw.

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::Frame;
use tracing::{debug, info};

use super::terminal::{self, Tui};
use super::ui;
use crate::canvas::{stamp_line, Brush, BrushCurve, Channel, FillJob, Rgba, Stabilizer, Tip};
use crate::client::FlutClient;
use crate::config::Config;
use crate::errors::{PinselError, Result};
use crate::net::transport::{Connector, TcpConnector};

/// What the held pointer button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Draw,
    Erase,
}

/// Main TUI application state
pub struct App<C: Connector = TcpConnector> {
    /// Should the app exit?
    pub should_quit: bool,

    client: FlutClient<C>,
    brushes: Vec<Brush>,
    active: usize,
    curve: BrushCurve,

    stabilizer: Stabilizer,
    stroke: Option<Stroke>,
    fill: Option<FillJob>,

    idle_frames: u32,
    keepalive_idle_frames: u32,
    tick_rate: Duration,
    last_draw: Option<Instant>,
    /// Status or layout changed since the last frame
    redraw: bool,

    /// Screen area the canvas was last drawn into, for pointer mapping
    canvas_area: Rect,
}

impl<C: Connector> App<C> {
    /// Create an app around a connected client
    pub fn new(client: FlutClient<C>, config: &Config) -> Self {
        let brushes = if config.brushes.is_empty() {
            vec![Brush::default()]
        } else {
            config.brushes.clone()
        };
        Self {
            should_quit: false,
            client,
            brushes,
            active: 0,
            curve: config.brush_curve,
            stabilizer: Stabilizer::new(),
            stroke: None,
            fill: None,
            idle_frames: 0,
            keepalive_idle_frames: config.keepalive_idle_frames.max(1),
            tick_rate: config.tick_rate(),
            last_draw: None,
            redraw: true,
            canvas_area: Rect::default(),
        }
    }

    /// Run the main event loop until the user quits
    pub fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        terminal::set_title(&format!("pinselflut {}", self.client.connection().endpoint()));

        while !self.should_quit {
            let due = self.last_draw.map_or(true, |t| t.elapsed() >= self.tick_rate);
            if due && (self.redraw || self.client.mirror().is_dirty()) {
                terminal
                    .draw(|frame| self.draw(frame))
                    .map_err(PinselError::Terminal)?;
                self.client.mark_mirror_clean();
                self.redraw = false;
                self.last_draw = Some(Instant::now());
            }

            if event::poll(self.tick_rate).map_err(PinselError::Terminal)? {
                let event = event::read().map_err(PinselError::Terminal)?;
                self.handle_event(event)?;
            } else {
                self.on_idle()?;
            }
        }

        self.client.flush()?;
        info!("quit after {} pixels", self.client.stats().pixels);
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.canvas_area = ui::render(frame, self);
    }

    pub fn client(&self) -> &FlutClient<C> {
        &self.client
    }

    pub fn brush(&self) -> &Brush {
        &self.brushes[self.active]
    }

    pub fn fill_progress(&self) -> Option<(u32, u32)> {
        self.fill.map(|job| (job.row(), job.height()))
    }

    pub fn stroke(&self) -> Option<Stroke> {
        self.stroke
    }

    pub fn set_canvas_area(&mut self, area: Rect) {
        self.canvas_area = area;
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.redraw = true;
                self.handle_key(key)
            }
            Event::Resize(_, _) => {
                self.redraw = true;
                Ok(())
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => Ok(()),
        }
    }

    /// One loop iteration without input
    pub fn on_idle(&mut self) -> Result<()> {
        if let Some(job) = self.fill.as_mut() {
            self.redraw = true;
            if !job.fill_step(&mut self.client)? {
                debug!("fill complete");
                self.fill = None;
            }
            return Ok(());
        }

        self.idle_frames += 1;
        if self.idle_frames >= self.keepalive_idle_frames {
            self.idle_frames = 0;
            self.client.keep_alive()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => self.clear_canvas(),
            KeyCode::Char('r') => self.brushes[self.active].step_channel(Channel::Red),
            KeyCode::Char('g') => self.brushes[self.active].step_channel(Channel::Green),
            KeyCode::Char('b') => self.brushes[self.active].step_channel(Channel::Blue),
            KeyCode::Char('a') => self.brushes[self.active].step_channel(Channel::Alpha),
            KeyCode::Char('+' | '=') => self.brushes[self.active].grow(),
            KeyCode::Char('-') => self.brushes[self.active].shrink(),
            KeyCode::Char(']') => self.brushes[self.active].steady(),
            KeyCode::Char('[') => self.brushes[self.active].unsteady(),
            KeyCode::Tab => {
                self.active = (self.active + 1) % self.brushes.len();
                self.stabilizer.release();
            }
            _ => {}
        }
        Ok(())
    }

    /// Start an incremental opaque black fill of the whole canvas
    fn clear_canvas(&mut self) {
        let dims = self.client.dimensions();
        self.fill = Some(FillJob::fill_rect(0, 0, dims.width, dims.height, Rgba::BLACK));
        info!("clearing {} canvas", dims);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.stabilizer.release();
                self.stroke = match button {
                    MouseButton::Left => Some(Stroke::Draw),
                    MouseButton::Middle => Some(Stroke::Erase),
                    MouseButton::Right => None,
                };
                self.pointer(mouse.column, mouse.row)
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => self.pointer(mouse.column, mouse.row),
            MouseEventKind::Up(_) => {
                self.stroke = None;
                self.stabilizer.release();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Map a terminal cell to canvas coordinates, at the cell center
    pub fn to_canvas(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        let area = self.canvas_area;
        if area.is_empty() || !area.contains((column, row).into()) {
            return None;
        }
        let dims = self.client.dimensions();
        let x = (f32::from(column - area.x) + 0.5) * dims.width as f32 / f32::from(area.width);
        let y = (f32::from(row - area.y) + 0.5) * dims.height as f32 / f32::from(area.height);
        Some((x, y))
    }

    /// Feed a pointer position to the stabilizer while a button is held
    fn pointer(&mut self, column: u16, row: u16) -> Result<()> {
        let Some(stroke) = self.stroke else {
            return Ok(());
        };
        let Some((x, y)) = self.to_canvas(column, row) else {
            return Ok(());
        };
        let brush = match stroke {
            Stroke::Draw => self.brush().clone(),
            Stroke::Erase => self.brush().eraser(),
        };
        if let Some((from, to)) = self.stabilizer.push(x, y, brush.stabilization) {
            stamp_line(&mut self.client, from, to, &Tip::of(&brush, self.curve))?;
        }
        Ok(())
    }
}
