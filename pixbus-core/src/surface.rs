//! Controller framebuffers
//!
//! Both supported controllers keep a private image of their display RAM,
//! but lay it out differently:
//!
//! ```text
//! PageFrameBuffer    1 bit per pixel, 8-row pages
//!                    byte = x + (y / 8) * width, bit = y % 8
//! NibbleFrameBuffer  3 bytes per pixel (R, G, B), low 4 bits significant
//!                    offset = (x + y * width) * 3
//! ```
//!
//! The compositor only needs per-pixel access, so both implement
//! [`Surface`] and everything above this module is layout-agnostic.

use alloc::vec::Vec;
use core::ops::BitXor;

use crate::bitmap::quantize_to_4bit;

/// Errors from framebuffer construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameBufferError {
    /// Width or height is zero
    ZeroDimension,
    /// Page-packed buffers need a height that is a multiple of 8
    HeightNotPageAligned,
    /// Buffer size overflows
    TooLarge,
    /// Allocation failed
    OutOfMemory,
}

impl core::fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            FrameBufferError::ZeroDimension => "zero width or height",
            FrameBufferError::HeightNotPageAligned => "height is not a multiple of 8",
            FrameBufferError::TooLarge => "framebuffer too large",
            FrameBufferError::OutOfMemory => "out of memory",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameBufferError {}

/// Per-pixel access to a destination framebuffer
pub trait Surface {
    /// Pixel value in this surface's native representation
    type Color: Copy + PartialEq + BitXor<Output = Self::Color>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Read a pixel, `None` outside the surface
    fn get(&self, x: u32, y: u32) -> Option<Self::Color>;

    /// Write a pixel; writes outside the surface are ignored
    fn put(&mut self, x: u32, y: u32, color: Self::Color);

    /// Convert an 8-bit-per-channel color to the native representation
    fn color_from_rgb(rgb: [u8; 3]) -> Self::Color;

    /// Set every pixel to `color`
    fn fill(&mut self, color: Self::Color) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.put(x, y, color);
            }
        }
    }
}

fn allocate(size: Option<u64>) -> Result<Vec<u8>, FrameBufferError> {
    let size = size
        .and_then(|s| usize::try_from(s).ok())
        .ok_or(FrameBufferError::TooLarge)?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| FrameBufferError::OutOfMemory)?;
    buf.resize(size, 0);
    Ok(buf)
}

/// Monochrome framebuffer organised in 8-row pages
///
/// One byte covers a column of 8 pixels with the top row in bit 0, the
/// native layout of SSD1306/SH1106 display RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrameBuffer {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl PageFrameBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, FrameBufferError> {
        if width == 0 || height == 0 {
            return Err(FrameBufferError::ZeroDimension);
        }
        if height % 8 != 0 {
            warn!("Page framebuffer height {=u32} not a multiple of 8", height);
            return Err(FrameBufferError::HeightNotPageAligned);
        }
        let buf = allocate((width as u64).checked_mul(height as u64 / 8))?;
        Ok(Self { width, height, buf })
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u32 {
        self.height / 8
    }

    /// Bytes of page `p`, one per column
    pub fn page(&self, p: u32) -> Option<&[u8]> {
        if p >= self.pages() {
            return None;
        }
        let start = p as usize * self.width as usize;
        self.buf.get(start..start + self.width as usize)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = x as usize + (y / 8) as usize * self.width as usize;
        Some((index, 1 << (y % 8)))
    }
}

impl Surface for PageFrameBuffer {
    type Color = bool;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, x: u32, y: u32) -> Option<bool> {
        self.locate(x, y)
            .map(|(index, mask)| self.buf[index] & mask != 0)
    }

    fn put(&mut self, x: u32, y: u32, on: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if on {
                self.buf[index] |= mask;
            } else {
                self.buf[index] &= !mask;
            }
        }
    }

    /// Lit when the color's luminance reaches half scale
    fn color_from_rgb([r, g, b]: [u8; 3]) -> bool {
        let luma = (r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8;
        luma >= 128
    }

    fn fill(&mut self, on: bool) {
        self.buf.fill(if on { 0xFF } else { 0x00 });
    }
}

/// 12-bit color, 4 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb444 {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb444 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xF, 0xF, 0xF);

    /// Channels are masked to their low 4 bits
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r & 0x0F,
            g: g & 0x0F,
            b: b & 0x0F,
        }
    }

    /// Keep the top 4 bits of each 8-bit channel
    pub const fn from_rgb888([r, g, b]: [u8; 3]) -> Self {
        Self::new(quantize_to_4bit(r), quantize_to_4bit(g), quantize_to_4bit(b))
    }

    pub const fn r(self) -> u8 {
        self.r
    }

    pub const fn g(self) -> u8 {
        self.g
    }

    pub const fn b(self) -> u8 {
        self.b
    }
}

impl BitXor for Rgb444 {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self::new(self.r ^ rhs.r, self.g ^ rhs.g, self.b ^ rhs.b)
    }
}

/// Color framebuffer with one byte per channel, low nibble significant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleFrameBuffer {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl NibbleFrameBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self, FrameBufferError> {
        if width == 0 || height == 0 {
            return Err(FrameBufferError::ZeroDimension);
        }
        let size = (width as u64)
            .checked_mul(height as u64)
            .and_then(|px| px.checked_mul(3));
        let buf = allocate(size)?;
        Ok(Self { width, height, buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Channel stream packed two nibbles per byte
    ///
    /// Consecutive channel values pair up high-nibble first, so two pixels
    /// become `R1G1 B1R2 G2B2`, the controller's 12-bit transfer order. An
    /// odd final channel is padded with a zero low nibble.
    pub fn packed(&self) -> impl Iterator<Item = u8> + '_ {
        self.buf.chunks(2).map(|pair| {
            let hi = pair[0] << 4;
            let lo = pair.get(1).copied().unwrap_or(0) & 0x0F;
            hi | lo
        })
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((x as usize + y as usize * self.width as usize) * 3)
    }
}

impl Surface for NibbleFrameBuffer {
    type Color = Rgb444;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get(&self, x: u32, y: u32) -> Option<Rgb444> {
        let i = self.offset(x, y)?;
        Some(Rgb444::new(self.buf[i], self.buf[i + 1], self.buf[i + 2]))
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb444) {
        if let Some(i) = self.offset(x, y) {
            self.buf[i] = color.r;
            self.buf[i + 1] = color.g;
            self.buf[i + 2] = color.b;
        }
    }

    fn color_from_rgb(rgb: [u8; 3]) -> Rgb444 {
        Rgb444::from_rgb888(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_buffer_geometry() {
        let fb = PageFrameBuffer::new(128, 64).unwrap();
        assert_eq!(fb.as_bytes().len(), 1024);
        assert_eq!(fb.pages(), 8);
        assert_eq!(fb.page(7).map(<[u8]>::len), Some(128));
        assert!(fb.page(8).is_none());
    }

    #[test]
    fn test_page_buffer_rejects_unaligned_height() {
        assert_eq!(
            PageFrameBuffer::new(64, 20),
            Err(FrameBufferError::HeightNotPageAligned)
        );
        assert_eq!(PageFrameBuffer::new(0, 8), Err(FrameBufferError::ZeroDimension));
    }

    #[test]
    fn test_page_buffer_addressing() {
        let mut fb = PageFrameBuffer::new(16, 16).unwrap();
        fb.put(3, 0, true);
        fb.put(3, 7, true);
        fb.put(5, 9, true);

        assert_eq!(fb.as_bytes()[3], 0b1000_0001);
        assert_eq!(fb.as_bytes()[5 + 16], 0b0000_0010);
        assert_eq!(fb.page(1).unwrap()[5], 0b0000_0010);
        assert_eq!(fb.get(5, 9), Some(true));
        assert_eq!(fb.get(5, 8), Some(false));
        assert_eq!(fb.get(16, 0), None);

        fb.put(3, 7, false);
        assert_eq!(fb.as_bytes()[3], 0b0000_0001);
    }

    #[test]
    fn test_page_buffer_ignores_out_of_range_put() {
        let mut fb = PageFrameBuffer::new(8, 8).unwrap();
        fb.put(8, 0, true);
        fb.put(0, 8, true);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_page_buffer_fill_and_clear() {
        let mut fb = PageFrameBuffer::new(4, 8).unwrap();
        fb.fill(true);
        assert_eq!(fb.as_bytes(), &[0xFF; 4]);
        fb.clear();
        assert_eq!(fb.as_bytes(), &[0x00; 4]);
    }

    #[test]
    fn test_mono_color_threshold() {
        assert!(PageFrameBuffer::color_from_rgb([255, 255, 255]));
        assert!(!PageFrameBuffer::color_from_rgb([0, 0, 0]));
        assert!(!PageFrameBuffer::color_from_rgb([0, 0, 255]));
        assert!(PageFrameBuffer::color_from_rgb([0, 255, 0]));
    }

    #[test]
    fn test_rgb444_masks_channels() {
        let c = Rgb444::new(0x1A, 0xF3, 0x20);
        assert_eq!((c.r(), c.g(), c.b()), (0xA, 0x3, 0x0));
        assert_eq!(Rgb444::from_rgb888([0xFF, 0x80, 0x0F]), Rgb444::new(0xF, 0x8, 0x0));
    }

    #[test]
    fn test_rgb444_xor() {
        let a = Rgb444::new(0xF, 0x0, 0x5);
        let b = Rgb444::new(0x3, 0x3, 0x5);
        assert_eq!(a ^ b, Rgb444::new(0xC, 0x3, 0x0));
        assert_eq!(a ^ b ^ b, a);
    }

    #[test]
    fn test_nibble_buffer_addressing() {
        let mut fb = NibbleFrameBuffer::new(4, 3).unwrap();
        assert_eq!(fb.as_bytes().len(), 36);

        fb.put(1, 2, Rgb444::new(1, 2, 3));
        let at = (1 + 2 * 4) * 3;
        assert_eq!(&fb.as_bytes()[at..at + 3], &[1, 2, 3]);
        assert_eq!(fb.get(1, 2), Some(Rgb444::new(1, 2, 3)));
        assert_eq!(fb.get(4, 0), None);
    }

    #[test]
    fn test_nibble_packing() {
        let mut fb = NibbleFrameBuffer::new(2, 1).unwrap();
        fb.put(0, 0, Rgb444::new(0x1, 0x2, 0x3));
        fb.put(1, 0, Rgb444::new(0x4, 0x5, 0x6));
        let packed: Vec<u8> = fb.packed().collect();
        assert_eq!(packed, vec![0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_nibble_packing_odd_tail() {
        let mut fb = NibbleFrameBuffer::new(1, 1).unwrap();
        fb.fill(Rgb444::new(0xA, 0xB, 0xC));
        let packed: Vec<u8> = fb.packed().collect();
        assert_eq!(packed, vec![0xAB, 0xC0]);
    }
}
