//! Pointer smoothing over a sliding window of samples

use std::collections::VecDeque;

/// A line segment between two committed points
pub type Segment = ((i32, i32), (i32, i32));

/// Averages the last `N` pointer samples of a gesture
///
/// Once the window is full every new sample commits the mean of the window
/// and then drops the oldest sample, so consecutive windows overlap.
#[derive(Debug, Clone, Default)]
pub struct Stabilizer {
    window: VecDeque<(f32, f32)>,
    last: Option<(i32, i32)>,
}

impl Stabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer sample while the gesture is active
    ///
    /// Returns the segment to stamp when the committed point moved. The
    /// first commit of a gesture only records its position.
    pub fn push(&mut self, x: f32, y: f32, length: usize) -> Option<Segment> {
        let length = length.max(1);
        self.window.push_back((x, y));
        while self.window.len() > length {
            self.window.pop_front();
        }
        if self.window.len() < length {
            return None;
        }

        let n = self.window.len() as f32;
        let (sx, sy) = self
            .window
            .iter()
            .fold((0.0, 0.0), |(ax, ay), (px, py)| (ax + px, ay + py));
        let committed = ((sx / n).round() as i32, (sy / n).round() as i32);
        self.window.pop_front();

        match self.last.replace(committed) {
            Some(previous) if previous != committed => Some((previous, committed)),
            _ => None,
        }
    }

    /// Forget the gesture when the pointer is released
    pub fn release(&mut self) {
        self.window.clear();
        self.last = None;
    }

    /// Last committed point of the current gesture
    pub fn last(&self) -> Option<(i32, i32)> {
        self.last
    }

    pub fn pending(&self) -> usize {
        self.window.len()
    }
}
