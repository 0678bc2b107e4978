//! Synthetic capture source
//!
//! Stands in for a rendered view: a scrolling gradient with a square that
//! bounces across it, so every captured frame differs from the last.

use gifcap::{CaptureResult, CaptureSource, Frame};

/// Animated test pattern
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    tick: u32,
}

impl SyntheticSource {
    /// Create a source producing `width` x `height` frames
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            tick: 0,
        }
    }

    /// Frames produced so far
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.tick
    }

    fn square_origin(&self) -> (u32, u32) {
        let side = self.square_side();
        let span_x = (self.width - side).max(1);
        let span_y = (self.height - side).max(1);
        let step = self.tick.wrapping_mul(3);
        (bounce(step, span_x), bounce(step / 2, span_y))
    }

    fn square_side(&self) -> u32 {
        (self.width.min(self.height) / 4).max(1)
    }

    /// Render the current pattern without advancing
    pub fn render(&self) -> CaptureResult<Frame> {
        let (sx, sy) = self.square_origin();
        let side = self.square_side();
        let shift = self.tick.wrapping_mul(4);

        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let inside = (sx..sx + side).contains(&x) && (sy..sy + side).contains(&y);
                if inside {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[
                        (x.wrapping_add(shift).wrapping_mul(255) / self.width.max(1)) as u8,
                        (y * 255 / self.height.max(1)) as u8,
                        (shift % 256) as u8,
                        255,
                    ]);
                }
            }
        }
        Frame::new(self.width, self.height, data)
    }
}

/// Triangle wave over `0..=span`
fn bounce(step: u32, span: u32) -> u32 {
    let period = span * 2;
    let phase = step % period;
    if phase <= span {
        phase
    } else {
        period - phase
    }
}

impl CaptureSource for SyntheticSource {
    fn grab(&mut self) -> CaptureResult<Frame> {
        let frame = self.render()?;
        self.tick = self.tick.wrapping_add(1);
        Ok(frame)
    }
}
