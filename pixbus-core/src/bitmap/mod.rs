//! Bitmap container
//!
//! A [`Bitmap`] holds pixels in one of two encodings:
//!
//! ```text
//! Depth::Mono  stride = ceil(width / 8)   bit k of row byte i = column 8*i + k
//! Depth::Rgba  stride = width * 4         R, G, B, A per pixel, row-major
//! ```
//!
//! Buffers are normally owned. A bitmap adopted from an embedded resource
//! borrows its bytes instead; the first write to such a bitmap copies the
//! data into an owned buffer, the borrowed memory is never touched.

mod draw;
mod histogram;
mod load;

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;


pub use histogram::{Channel, Histogram};
pub use load::{LoadError, HEADER_LEN, MAX_FILE_SIZE};

/// Pixel encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Depth {
    /// 1 bit per pixel, packed LSB-first along rows
    #[default]
    Mono,
    /// 4 bytes per pixel (R, G, B, alpha/unused)
    Rgba,
}

impl Depth {
    /// Bits per pixel as stored in the pixbus file header
    pub const fn bits(self) -> u32 {
        match self {
            Depth::Mono => 1,
            Depth::Rgba => 32,
        }
    }

    /// Depth from its bits-per-pixel value
    pub fn from_bits(bits: u32) -> Result<Self, BitmapError> {
        match bits {
            1 => Ok(Depth::Mono),
            32 => Ok(Depth::Rgba),
            _ => Err(BitmapError::UnsupportedDepth),
        }
    }

    /// Bytes per row for an image `width` pixels wide
    pub const fn stride(self, width: u32) -> u64 {
        match self {
            Depth::Mono => (width as u64 + 7) / 8,
            Depth::Rgba => width as u64 * 4,
        }
    }
}

/// Errors from bitmap creation and pixel access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitmapError {
    /// Depth other than 1 or 32 bits per pixel
    UnsupportedDepth,
    /// Width or height is zero
    ZeroDimension,
    /// Buffer size does not fit in memory
    DimensionOverflow,
    /// Allocation failed
    OutOfMemory,
    /// Coordinates outside the bitmap
    OutOfBounds,
    /// Operation not defined for this bitmap's depth
    WrongDepth,
    /// Bitmap has no pixel buffer
    Empty,
    /// Supplied buffer shorter than stride * height
    BufferTooSmall,
}

impl core::fmt::Display for BitmapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            BitmapError::UnsupportedDepth => "unsupported colour depth",
            BitmapError::ZeroDimension => "zero width or height",
            BitmapError::DimensionOverflow => "dimensions overflow",
            BitmapError::OutOfMemory => "out of memory",
            BitmapError::OutOfBounds => "coordinates out of bounds",
            BitmapError::WrongDepth => "operation not supported at this depth",
            BitmapError::Empty => "bitmap has no pixels",
            BitmapError::BufferTooSmall => "pixel buffer too small",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BitmapError {}

/// Stride and buffer size for the given geometry
pub(crate) fn geometry(width: u32, height: u32, depth: Depth) -> Result<(usize, usize), BitmapError> {
    if width == 0 || height == 0 {
        return Err(BitmapError::ZeroDimension);
    }
    let stride = depth.stride(width);
    let size = stride
        .checked_mul(height as u64)
        .ok_or(BitmapError::DimensionOverflow)?;
    let stride = usize::try_from(stride).map_err(|_| BitmapError::DimensionOverflow)?;
    let size = usize::try_from(size).map_err(|_| BitmapError::DimensionOverflow)?;
    Ok((stride, size))
}

/// Allocate a zeroed buffer, reporting allocation failure instead of aborting
pub(crate) fn zeroed(size: usize) -> Result<Vec<u8>, BitmapError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| BitmapError::OutOfMemory)?;
    buf.resize(size, 0);
    Ok(buf)
}

/// 8-bit channel value reduced to its top 4 bits
pub const fn quantize_to_4bit(byte: u8) -> u8 {
    byte >> 4
}

/// Pixel container with drawing primitives
///
/// The default bitmap is empty: zero-sized with no buffer.
#[derive(Debug, Clone, Default)]
pub struct Bitmap<'a> {
    width: u32,
    height: u32,
    depth: Depth,
    stride: usize,
    pixels: Cow<'a, [u8]>,
    histogram: Option<Box<Histogram>>,
}

impl<'a> Bitmap<'a> {
    /// Allocate a zeroed bitmap
    pub fn new(width: u32, height: u32, depth: Depth) -> Result<Self, BitmapError> {
        let (stride, size) = geometry(width, height, depth).map_err(|e| {
            warn!("Rejected bitmap {=u32}x{=u32}: {}", width, height, e);
            e
        })?;
        let pixels = zeroed(size)?;
        Ok(Self {
            width,
            height,
            depth,
            stride,
            pixels: Cow::Owned(pixels),
            histogram: None,
        })
    }

    /// Build an RGBA bitmap from decoded pixel bytes
    ///
    /// `pixels` must hold exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        let (stride, size) = geometry(width, height, Depth::Rgba)?;
        if pixels.len() != size {
            return Err(BitmapError::BufferTooSmall);
        }
        Ok(Self {
            width,
            height,
            depth: Depth::Rgba,
            stride,
            pixels: Cow::Owned(pixels),
            histogram: None,
        })
    }

    /// Replace this bitmap with a freshly allocated zeroed one
    ///
    /// On failure the previous buffer is released and the bitmap is left
    /// empty.
    pub fn create(&mut self, width: u32, height: u32, depth: Depth) -> Result<(), BitmapError> {
        match Bitmap::new(width, height, depth) {
            Ok(bitmap) => {
                *self = bitmap;
                Ok(())
            }
            Err(e) => {
                *self = Bitmap::default();
                Err(e)
            }
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw pixel bytes, `stride * height` long
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True if the bitmap has no pixel buffer
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True if the pixels live in memory this bitmap does not own
    pub fn is_borrowed(&self) -> bool {
        matches!(self.pixels, Cow::Borrowed(_))
    }

    /// Bytes of row `y`
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.pixels.get(start..start + self.stride)
    }

    /// Set every byte of the buffer to zero
    pub fn zero(&mut self) {
        if self.is_empty() {
            return;
        }
        self.pixels.to_mut().fill(0);
        self.histogram = None;
    }

    /// Set or clear one pixel of a monochrome bitmap
    pub fn set_pixel(&mut self, x: u32, y: u32, set: bool) -> Result<(), BitmapError> {
        if self.depth != Depth::Mono {
            return Err(BitmapError::WrongDepth);
        }
        if x >= self.width || y >= self.height {
            return Err(BitmapError::OutOfBounds);
        }
        let index = (x / 8) as usize + y as usize * self.stride;
        let mask = 1u8 << (x % 8);
        let bytes = self.pixels.to_mut();
        if set {
            bytes[index] |= mask;
        } else {
            bytes[index] &= !mask;
        }
        Ok(())
    }

    /// Test one pixel of a monochrome bitmap
    ///
    /// Out-of-range coordinates and RGBA bitmaps read as unset.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if self.depth != Depth::Mono || x >= self.width || y >= self.height {
            return false;
        }
        let index = (x / 8) as usize + y as usize * self.stride;
        self.pixels[index] & (1 << (x % 8)) != 0
    }

    /// Read one pixel of an RGBA bitmap
    pub fn rgba(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.depth != Depth::Rgba || x >= self.width || y >= self.height {
            return None;
        }
        let i = x as usize * 4 + y as usize * self.stride;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Render a monochrome bitmap as text, `#` for set pixels
    ///
    /// Debugging aid; RGBA bitmaps render every pixel as `#`.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let set = match self.depth {
                    Depth::Mono => self.is_set(x, y),
                    Depth::Rgba => true,
                };
                out.push(if set { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_mono_geometry() {
        let bmp = Bitmap::new(13, 5, Depth::Mono).unwrap();
        assert_eq!(bmp.stride(), 2);
        assert_eq!(bmp.pixels().len(), 10);
        assert!(bmp.pixels().iter().all(|&b| b == 0));
        assert!(!bmp.is_borrowed());
    }

    #[test]
    fn test_new_rgba_geometry() {
        let bmp = Bitmap::new(3, 2, Depth::Rgba).unwrap();
        assert_eq!(bmp.stride(), 12);
        assert_eq!(bmp.pixels().len(), 24);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(Bitmap::new(0, 5, Depth::Mono).unwrap_err(), BitmapError::ZeroDimension);
        assert_eq!(Bitmap::new(5, 0, Depth::Rgba).unwrap_err(), BitmapError::ZeroDimension);
    }

    #[test]
    fn test_depth_from_bits() {
        assert_eq!(Depth::from_bits(1), Ok(Depth::Mono));
        assert_eq!(Depth::from_bits(32), Ok(Depth::Rgba));
        assert_eq!(Depth::from_bits(24), Err(BitmapError::UnsupportedDepth));
        assert_eq!(Depth::from_bits(8), Err(BitmapError::UnsupportedDepth));
    }

    #[test]
    fn test_create_failure_releases_buffer() {
        let mut bmp = Bitmap::new(8, 8, Depth::Mono).unwrap();
        assert_eq!(bmp.create(0, 8, Depth::Mono), Err(BitmapError::ZeroDimension));
        assert!(bmp.is_empty());
        assert_eq!(bmp.width(), 0);
    }

    #[test]
    fn test_create_replaces_buffer() {
        let mut bmp = Bitmap::new(8, 8, Depth::Mono).unwrap();
        bmp.set_pixel(1, 1, true).unwrap();
        bmp.create(16, 2, Depth::Rgba).unwrap();
        assert_eq!(bmp.depth(), Depth::Rgba);
        assert_eq!(bmp.pixels().len(), 128);
        assert!(bmp.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_pixel_lsb_first() {
        let mut bmp = Bitmap::new(16, 2, Depth::Mono).unwrap();
        bmp.set_pixel(0, 0, true).unwrap();
        bmp.set_pixel(9, 1, true).unwrap();
        assert_eq!(bmp.pixels(), &[0x01, 0x00, 0x00, 0x02]);
        assert!(bmp.is_set(9, 1));

        bmp.set_pixel(0, 0, false).unwrap();
        assert!(!bmp.is_set(0, 0));
        assert_eq!(bmp.pixels()[0], 0);
    }

    #[test]
    fn test_set_pixel_out_of_range_has_no_effect() {
        let mut bmp = Bitmap::new(8, 8, Depth::Mono).unwrap();
        assert_eq!(bmp.set_pixel(8, 0, true), Err(BitmapError::OutOfBounds));
        assert_eq!(bmp.set_pixel(0, 8, true), Err(BitmapError::OutOfBounds));
        assert!(bmp.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_pixel_rejects_rgba() {
        let mut bmp = Bitmap::new(4, 4, Depth::Rgba).unwrap();
        assert_eq!(bmp.set_pixel(0, 0, true), Err(BitmapError::WrongDepth));
    }

    #[test]
    fn test_zero_clears_buffer() {
        let mut bmp = Bitmap::new(8, 2, Depth::Mono).unwrap();
        bmp.set_pixel(3, 1, true).unwrap();
        bmp.zero();
        assert!(bmp.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rgba_accessor() {
        let bmp = Bitmap::from_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(bmp.rgba(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(bmp.rgba(2, 0), None);
        assert!(!bmp.is_set(0, 0));
    }

    #[test]
    fn test_from_rgba_size_mismatch() {
        assert_eq!(
            Bitmap::from_rgba(2, 2, vec![0; 15]).unwrap_err(),
            BitmapError::BufferTooSmall
        );
    }

    #[test]
    fn test_row_access() {
        let mut bmp = Bitmap::new(10, 3, Depth::Mono).unwrap();
        bmp.set_pixel(8, 2, true).unwrap();
        assert_eq!(bmp.row(2), Some(&[0x00, 0x01][..]));
        assert_eq!(bmp.row(3), None);
    }

    #[test]
    fn test_to_ascii() {
        let mut bmp = Bitmap::new(3, 2, Depth::Mono).unwrap();
        bmp.set_pixel(1, 0, true).unwrap();
        bmp.set_pixel(2, 1, true).unwrap();
        assert_eq!(bmp.to_ascii(), ".#.\n..#\n");
    }

    #[test]
    fn test_quantize_to_4bit() {
        assert_eq!(quantize_to_4bit(0x00), 0x0);
        assert_eq!(quantize_to_4bit(0x0F), 0x0);
        assert_eq!(quantize_to_4bit(0x10), 0x1);
        assert_eq!(quantize_to_4bit(0x80), 0x8);
        assert_eq!(quantize_to_4bit(0xFF), 0xF);
    }

    proptest! {
        #[test]
        fn test_mono_stride_law(width in 1u32..300, height in 1u32..64) {
            let bmp = Bitmap::new(width, height, Depth::Mono).unwrap();
            prop_assert_eq!(bmp.stride(), ((width + 7) / 8) as usize);
            prop_assert_eq!(bmp.pixels().len(), bmp.stride() * height as usize);
        }

        #[test]
        fn test_rgba_stride_law(width in 1u32..300, height in 1u32..64) {
            let bmp = Bitmap::new(width, height, Depth::Rgba).unwrap();
            prop_assert_eq!(bmp.stride(), width as usize * 4);
            prop_assert_eq!(bmp.pixels().len(), bmp.stride() * height as usize);
        }
    }
}
