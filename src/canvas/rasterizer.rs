//! Brush rasterization: soft point stamps and gap-free lines of stamps

use super::brush::{Brush, BrushCurve};
use super::color::Rgba;
use super::framebuffer::Framebuffer;
use crate::errors::Result;

/// Anything that accepts individual pixel updates
///
/// Coordinates are signed because brush footprints near the canvas edge
/// reach past it; implementations drop off-canvas pixels silently.
pub trait PixelSink {
    fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<()>;
}

impl PixelSink for Framebuffer {
    fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<()> {
        self.blend(x, y, color);
        Ok(())
    }
}

/// Everything needed to stamp one brush footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tip {
    /// Diameter in pixels
    pub size: u32,
    pub color: Rgba,
    pub curve: BrushCurve,
}

impl Tip {
    pub fn new(size: u32, color: Rgba, curve: BrushCurve) -> Self {
        Self { size, color, curve }
    }

    pub fn of(brush: &Brush, curve: BrushCurve) -> Self {
        Self::new(brush.size, brush.color, curve)
    }
}

/// Stamp a soft disc of diameter `tip.size` centered at `(cx, cy)`
///
/// Cells below the curve's visibility threshold are never emitted.
pub fn stamp_point<S: PixelSink + ?Sized>(sink: &mut S, cx: i32, cy: i32, tip: &Tip) -> Result<()> {
    if tip.size == 0 {
        return Ok(());
    }
    let size = tip.size as i32;
    let radius = tip.size as f32 / 2.0;
    let half = size / 2;

    for yi in 0..size {
        let dy = (yi - half) as f32;
        for xi in 0..size {
            let dx = (xi - half) as f32;
            let distance = (dx * dx + dy * dy).sqrt();
            if let Some(alpha) = tip.curve.alpha_at(distance, radius, tip.color.a) {
                sink.put_pixel(cx + xi - half, cy + yi - half, tip.color.with_alpha(alpha))?;
            }
        }
    }
    Ok(())
}

/// Stamp along the Bresenham line from `from` to `to`, endpoints included
pub fn stamp_line<S: PixelSink + ?Sized>(
    sink: &mut S,
    from: (i32, i32),
    to: (i32, i32),
    tip: &Tip,
) -> Result<()> {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = (if dx > dy { dx } else { -dy }) / 2;

    loop {
        // TODO: stamps overlap heavily along the path; send only the cells each step adds
        stamp_point(sink, x0, y0, tip)?;
        if x0 == x1 && y0 == y1 {
            return Ok(());
        }
        let e2 = err;
        if e2 > -dx {
            err -= dy;
            x0 += sx;
        }
        if e2 < dy {
            err += dx;
            y0 += sy;
        }
    }
}
