//! Brush parameters and the soft falloff curve

use serde::{Deserialize, Serialize};

use super::color::Rgba;

/// Smallest and largest brush diameter the front-end allows
pub const MIN_SIZE: u32 = 1;
pub const MAX_SIZE: u32 = 32;

/// Longest stabilization window the front-end allows
pub const MAX_STABILIZATION: usize = 32;

/// Amount a color channel changes per key press
pub const COLOR_STEP: u8 = 16;

/// A named brush
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub name: String,
    pub color: Rgba,
    /// Stroke diameter in pixels
    pub size: u32,
    /// Number of pointer samples averaged per committed point
    pub stabilization: usize,
}

impl Default for Brush {
    fn default() -> Self {
        Self::new("pen", Rgba::WHITE, 7, 4)
    }
}

impl Brush {
    pub fn new(name: impl Into<String>, color: Rgba, size: u32, stabilization: usize) -> Self {
        Self {
            name: name.into(),
            color,
            size: size.clamp(MIN_SIZE, MAX_SIZE),
            stabilization: stabilization.clamp(1, MAX_STABILIZATION),
        }
    }

    /// The brush used while erasing: opaque black at twice the size
    pub fn eraser(&self) -> Self {
        Self {
            name: "eraser".to_string(),
            color: Rgba::BLACK,
            size: self.size.saturating_mul(2),
            stabilization: self.stabilization,
        }
    }

    pub fn grow(&mut self) {
        self.size = (self.size + 1).min(MAX_SIZE);
    }

    pub fn shrink(&mut self) {
        self.size = self.size.saturating_sub(1).max(MIN_SIZE);
    }

    pub fn steady(&mut self) {
        self.stabilization = (self.stabilization + 1).min(MAX_STABILIZATION);
    }

    pub fn unsteady(&mut self) {
        self.stabilization = self.stabilization.saturating_sub(1).max(1);
    }

    /// Step one channel, wrapping around at 256
    pub fn step_channel(&mut self, channel: Channel) {
        let c = &mut self.color;
        let value = match channel {
            Channel::Red => &mut c.r,
            Channel::Green => &mut c.g,
            Channel::Blue => &mut c.b,
            Channel::Alpha => &mut c.a,
        };
        *value = value.wrapping_add(COLOR_STEP);
    }
}

/// A color channel of a brush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

/// Shape of the soft brush edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushCurve {
    /// Exponent applied to the linear radial falloff
    pub steepness: f32,
    /// Exponent applied to the brush alpha before it scales the falloff
    pub alpha_softening: f32,
    /// Cells with less intensity than this are not sent at all
    pub min_visible: f32,
}

impl Default for BrushCurve {
    fn default() -> Self {
        Self {
            steepness: 7.0,
            alpha_softening: 1.0 / 5.0,
            min_visible: 0.03,
        }
    }
}

impl BrushCurve {
    /// Alpha for a cell at `distance` from the center of a brush of `radius`,
    /// or `None` when the cell is not worth sending
    #[inline]
    pub fn alpha_at(&self, distance: f32, radius: f32, brush_alpha: u8) -> Option<u8> {
        let falloff = (1.0 - distance / radius).max(0.0).powf(self.steepness);
        let softened = (f32::from(brush_alpha) / 255.0).powf(self.alpha_softening);
        let intensity = falloff * softened;
        (intensity > self.min_visible).then(|| (intensity * 255.0) as u8)
    }
}
