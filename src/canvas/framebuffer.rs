//! Local mirror of the remote canvas

use super::color::{Rgb, Rgba};

/// Canvas dimensions in pixels, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Map signed coordinates to a cell if they lie on the canvas
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// In-memory RGB framebuffer matching the remote canvas
///
/// Starts black and is only ever mutated through [`Framebuffer::blend`],
/// so it shows what the client believes the server displays.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    dims: Dimensions,
    /// Pixel data (row-major)
    pixels: Vec<Rgb>,
    /// Dirty flag for incremental rendering
    dirty: bool,
}

impl Framebuffer {
    /// Allocate a zero-filled mirror of the given size
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            pixels: vec![Rgb::BLACK; dims.area()],
            dirty: true,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    /// Get pixel at coordinates
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.dims.width && y < self.dims.height {
            Some(self.pixels[(y * self.dims.width + x) as usize])
        } else {
            None
        }
    }

    /// Blend a color into one cell; off-canvas coordinates are ignored
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some((x, y)) = self.dims.contains(x, y) {
            let idx = (y * self.dims.width + x) as usize;
            self.pixels[idx] = self.pixels[idx].blend(color);
            self.dirty = true;
        }
    }

    /// Get raw pixel data
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Check if the mirror changed since the last [`Framebuffer::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_framebuffer() {
        let fb = Framebuffer::new(Dimensions::new(100, 50));
        assert_eq!(fb.width(), 100);
        assert_eq!(fb.height(), 50);
        assert_eq!(fb.pixels().len(), 5000);
        assert!(fb.pixels().iter().all(|p| *p == Rgb::BLACK));
    }

    #[test]
    fn test_blend_pixel() {
        let mut fb = Framebuffer::new(Dimensions::new(10, 10));
        fb.blend(5, 5, Rgba::RED);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgb::new(255, 0, 0)));
        assert_eq!(fb.get_pixel(4, 5), Some(Rgb::BLACK));
    }

    #[test]
    fn test_blend_out_of_bounds_is_noop() {
        let mut fb = Framebuffer::new(Dimensions::new(10, 10));
        fb.mark_clean();
        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 10), (i32::MAX, i32::MIN)] {
            fb.blend(x, y, Rgba::WHITE);
        }
        assert!(!fb.is_dirty());
        assert!(fb.pixels().iter().all(|p| *p == Rgb::BLACK));
    }

    proptest! {
        #[test]
        fn prop_blend_touches_only_target_cell(
            x in 0i32..16, y in 0i32..8,
            r: u8, g: u8, b: u8, a: u8,
        ) {
            let mut fb = Framebuffer::new(Dimensions::new(16, 8));
            fb.blend(3, 3, Rgba::new(40, 80, 120, 255));
            let before = fb.clone();

            fb.blend(x, y, Rgba::new(r, g, b, a));

            for cy in 0..8u32 {
                for cx in 0..16u32 {
                    let old = before.get_pixel(cx, cy).unwrap_or_default();
                    let now = fb.get_pixel(cx, cy).unwrap_or_default();
                    if (cx as i32, cy as i32) == (x, y) {
                        let mix = |o: u8, n: u8| {
                            ((u32::from(o) * (255 - u32::from(a)) + u32::from(n) * u32::from(a)) / 255) as u8
                        };
                        prop_assert_eq!(now, Rgb::new(mix(old.r, r), mix(old.g, g), mix(old.b, b)));
                    } else {
                        prop_assert_eq!(now, old);
                    }
                }
            }
        }
    }
}
