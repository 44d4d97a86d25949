//! Half-block view of the canvas mirror
//!
//! Each terminal cell shows 2 vertical canvas samples:
//! - ▀ (upper half block): top = fg, bottom = bg
//! - ' ' (space): both = bg, used when the samples agree

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use crate::canvas::{Framebuffer, Rgb};

/// Widget drawing a [`Framebuffer`] scaled to its area
#[derive(Debug)]
pub struct MirrorView<'a> {
    fb: &'a Framebuffer,
}

impl<'a> MirrorView<'a> {
    pub fn new(fb: &'a Framebuffer) -> Self {
        Self { fb }
    }

    /// Nearest canvas pixel for subpixel row `sub` (two per terminal row) and column `col`
    fn sample(&self, col: u16, sub: u32, area: Rect) -> Rgb {
        let x = u32::from(col) * self.fb.width() / u32::from(area.width.max(1));
        let y = sub * self.fb.height() / (u32::from(area.height.max(1)) * 2);
        self.fb
            .get_pixel(x.min(self.fb.width() - 1), y.min(self.fb.height() - 1))
            .unwrap_or(Rgb::BLACK)
    }
}

/// Pick the half-block character and colors for a top/bottom pair
fn select_halfblock(top: Rgb, bottom: Rgb) -> (&'static str, Rgb, Rgb) {
    if top == bottom {
        (" ", top, top)
    } else {
        ("▀", top, bottom)
    }
}

impl Widget for MirrorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() || self.fb.width() == 0 || self.fb.height() == 0 {
            return;
        }
        for row in 0..area.height {
            for col in 0..area.width {
                let top = self.sample(col, u32::from(row) * 2, area);
                let bottom = self.sample(col, u32::from(row) * 2 + 1, area);
                let (symbol, fg, bg) = select_halfblock(top, bottom);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(symbol)
                        .set_fg(fg.to_ratatui())
                        .set_bg(bg.to_ratatui());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Dimensions, Rgba};

    #[test]
    fn test_renders_two_rows_per_cell() {
        let mut fb = Framebuffer::new(Dimensions::new(2, 2));
        fb.blend(0, 0, Rgba::RED);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        MirrorView::new(&fb).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, ratatui::style::Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, ratatui::style::Color::Rgb(0, 0, 0));
        assert_eq!(buf[(1, 0)].symbol(), " ");
    }

    #[test]
    fn test_scales_large_canvas_down() {
        let mut fb = Framebuffer::new(Dimensions::new(100, 50));
        for y in 0..50 {
            fb.blend(99, y, Rgba::WHITE);
        }
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        MirrorView::new(&fb).render(area, &mut buf);
        // column 9 samples canvas x = 90, not the white edge
        assert_eq!(buf[(9, 0)].bg, ratatui::style::Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_select_halfblock() {
        let white = Rgb::new(255, 255, 255);
        assert_eq!(select_halfblock(white, white).0, " ");
        assert_eq!(select_halfblock(white, Rgb::BLACK), ("▀", white, Rgb::BLACK));
    }
}
