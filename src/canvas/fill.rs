//! Incremental rectangle fill, one row per step

use super::color::Rgba;
use super::rasterizer::PixelSink;
use crate::errors::Result;

/// An in-progress fill of a whole rectangle
///
/// `row` only ever grows from 0 to `height`; the job is complete once they meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillJob {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba,
    row: u32,
}

impl FillJob {
    /// Start filling the rectangle at `(x, y)` from its first row
    pub fn fill_rect(x: i32, y: i32, width: u32, height: u32, color: Rgba) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
            row: 0,
        }
    }

    /// Paint the next row, returning whether rows remain afterwards
    ///
    /// Calling this on a finished job paints nothing and keeps returning `false`.
    pub fn fill_step<S: PixelSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if self.is_complete() {
            return Ok(false);
        }
        let y = self.y + self.row as i32;
        for col in 0..self.width {
            sink.put_pixel(self.x + col as i32, y, self.color)?;
        }
        self.row += 1;
        Ok(!self.is_complete())
    }

    pub fn is_complete(&self) -> bool {
        self.row >= self.height
    }

    /// Rows painted so far
    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::rasterizer::tests::Recorder;
    use std::collections::HashMap;

    #[test]
    fn test_fill_paints_every_cell_once() {
        let mut job = FillJob::fill_rect(2, 3, 5, 4, Rgba::BLUE);
        let mut rec = Recorder::default();

        let mut reports = Vec::new();
        for _ in 0..4 {
            reports.push(job.fill_step(&mut rec).unwrap());
        }
        assert_eq!(reports, vec![true, true, true, false]);

        let mut seen: HashMap<(i32, i32), usize> = HashMap::new();
        for (x, y, c) in &rec.pixels {
            assert_eq!(*c, Rgba::BLUE);
            *seen.entry((*x, *y)).or_default() += 1;
        }
        assert_eq!(seen.len(), 20);
        assert!(seen.values().all(|n| *n == 1));
        assert!(seen.keys().all(|(x, y)| (2..7).contains(x) && (3..7).contains(y)));
    }

    #[test]
    fn test_finished_job_stays_finished() {
        let mut job = FillJob::fill_rect(0, 0, 3, 1, Rgba::RED);
        let mut rec = Recorder::default();
        assert!(!job.fill_step(&mut rec).unwrap());
        let painted = rec.pixels.len();

        for _ in 0..5 {
            assert!(!job.fill_step(&mut rec).unwrap());
        }
        assert_eq!(rec.pixels.len(), painted);
        assert!(job.is_complete());
        assert_eq!(job.row(), job.height());
    }

    #[test]
    fn test_empty_rect_is_complete() {
        let mut job = FillJob::fill_rect(0, 0, 10, 0, Rgba::RED);
        let mut rec = Recorder::default();
        assert!(job.is_complete());
        assert!(!job.fill_step(&mut rec).unwrap());
        assert!(rec.pixels.is_empty());
    }

    #[test]
    fn test_default_job_is_complete() {
        assert!(FillJob::default().is_complete());
    }
}
