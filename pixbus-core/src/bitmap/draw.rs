//! Line and rectangle drawing for monochrome bitmaps
//!
//! Coordinates are signed and may lie anywhere; everything is clipped to
//! the bitmap. Drawing calls return `true` when at least one pixel landed
//! on the canvas. A `false` return is informational only.
//!
//! Lines step along their major axis. At step `k` the minor offset is
//! `floor((2*k*minor + major) / (2*major))`, i.e. the ideal line rounded
//! half up, which is the pixel set Bresenham's error accumulator produces.
//! Because the offset is a closed form, the visible range of `k` is
//! computed directly and off-canvas stretches are never walked.

use alloc::borrow::Cow;

use super::{Bitmap, BitmapError, Depth};

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Mutable view of a monochrome pixel buffer
///
/// A borrowed buffer is only copied once a pixel actually lands on it.
pub(super) struct Canvas<'b, 'a> {
    buf: &'b mut Cow<'a, [u8]>,
    stride: usize,
    width: i64,
    height: i64,
}

impl<'b, 'a> Canvas<'b, 'a> {
    pub(super) fn new(buf: &'b mut Cow<'a, [u8]>, stride: usize, width: u32, height: u32) -> Self {
        Self {
            buf,
            stride,
            width: width as i64,
            height: height as i64,
        }
    }

    fn outcode(&self, x: i64, y: i64) -> u8 {
        let mut code = INSIDE;
        if x < 0 {
            code |= LEFT;
        } else if x >= self.width {
            code |= RIGHT;
        }
        if y < 0 {
            code |= TOP;
        } else if y >= self.height {
            code |= BOTTOM;
        }
        code
    }

    /// Caller guarantees the coordinates are on the canvas
    fn set(&mut self, x: i64, y: i64) {
        let index = (x / 8) as usize + y as usize * self.stride;
        self.buf.to_mut()[index] |= 1 << (x % 8);
    }

    fn plot(&mut self, x: i64, y: i64) -> bool {
        if self.outcode(x, y) != INSIDE {
            return false;
        }
        self.set(x, y);
        true
    }

    /// Horizontal run from `x0` to `x1` inclusive on row `y`
    pub(super) fn hline(&mut self, x0: i64, x1: i64, y: i64) -> bool {
        if y < 0 || y >= self.height {
            return false;
        }
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let lo = lo.max(0);
        let hi = hi.min(self.width - 1);
        if lo > hi {
            return false;
        }
        for x in lo..=hi {
            self.set(x, y);
        }
        true
    }

    /// Vertical run from `y0` to `y1` inclusive on column `x`
    pub(super) fn vline(&mut self, x: i64, y0: i64, y1: i64) -> bool {
        if x < 0 || x >= self.width {
            return false;
        }
        let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        let lo = lo.max(0);
        let hi = hi.min(self.height - 1);
        if lo > hi {
            return false;
        }
        for y in lo..=hi {
            self.set(x, y);
        }
        true
    }

    pub(super) fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) -> bool {
        if self.outcode(x0, y0) & self.outcode(x1, y1) != INSIDE {
            // Both ends beyond the same edge
            return false;
        }
        if x0 == x1 {
            return self.vline(x0, y0, y1);
        }
        if y0 == y1 {
            return self.hline(x0, x1, y0);
        }
        self.line_stepped(x0, y0, x1, y1)
    }

    /// General stepping line, valid for any direction
    pub(super) fn line_stepped(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) -> bool {
        let dx = x1 - x0;
        let dy = y1 - y0;
        if dx == 0 && dy == 0 {
            return self.plot(x0, y0);
        }

        let x_major = dx.abs() >= dy.abs();
        let (major0, minor0, major_len, minor_len, major_step, minor_step, major_extent) = if x_major {
            (x0, y0, dx.abs(), dy.abs(), dx.signum(), dy.signum(), self.width)
        } else {
            (y0, x0, dy.abs(), dx.abs(), dy.signum(), dx.signum(), self.height)
        };

        let Some((k_lo, k_hi)) = visible_steps(major0, major_step, major_len, major_extent) else {
            return false;
        };

        let mut drawn = false;
        for k in k_lo..=k_hi {
            let offset = (2 * k as i128 * minor_len as i128 + major_len as i128)
                / (2 * major_len as i128);
            let major = major0 + major_step * k;
            let minor = minor0 + minor_step * offset as i64;
            let (x, y) = if x_major { (major, minor) } else { (minor, major) };
            drawn |= self.plot(x, y);
        }
        drawn
    }
}

/// Range of steps `k` in `0..=len` with `start + step*k` inside `0..extent`
fn visible_steps(start: i64, step: i64, len: i64, extent: i64) -> Option<(i64, i64)> {
    let (lo, hi) = if step > 0 {
        (-start, extent - 1 - start)
    } else {
        (start - (extent - 1), start)
    };
    let lo = lo.max(0);
    let hi = hi.min(len);
    (lo <= hi).then_some((lo, hi))
}

impl<'a> Bitmap<'a> {
    fn canvas(&mut self) -> Result<Canvas<'_, 'a>, BitmapError> {
        if self.depth != Depth::Mono {
            return Err(BitmapError::WrongDepth);
        }
        let (stride, width, height) = (self.stride, self.width, self.height);
        Ok(Canvas::new(&mut self.pixels, stride, width, height))
    }

    /// Draw a straight line between two points, clipped to the bitmap
    ///
    /// Returns `Ok(false)` if no part of the line is visible.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<bool, BitmapError> {
        let mut canvas = self.canvas()?;
        Ok(canvas.line(x0 as i64, y0 as i64, x1 as i64, y1 as i64))
    }

    /// Draw a rectangle outline, optionally filled
    ///
    /// Each edge is clipped on its own, so a partly visible rectangle draws
    /// its visible edges. Returns `Ok(false)` if nothing was visible.
    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        fill: bool,
    ) -> Result<bool, BitmapError> {
        let mut canvas = self.canvas()?;
        if width <= 0 || height <= 0 {
            return Ok(false);
        }

        let (x0, y0) = (x as i64, y as i64);
        let x1 = x0 + width as i64 - 1;
        let y1 = y0 + height as i64 - 1;

        let mut drawn = canvas.line(x0, y0, x1, y0);
        drawn |= canvas.line(x0, y1, x1, y1);
        drawn |= canvas.line(x0, y0, x0, y1);
        drawn |= canvas.line(x1, y0, x1, y1);

        if fill {
            let first = (y0 + 1).max(0);
            let last = (y1 - 1).min(canvas.height - 1);
            for row in first..=last {
                drawn |= canvas.hline(x0, x1, row);
            }
        }
        Ok(drawn)
    }
}
