//! Bitmap loaders and the pixbus binary file format
//!
//! File layout, all integers little-endian:
//!
//! ```text
//! offset  size            field
//! 0       4               width
//! 4       4               height
//! 8       4               depth (1 or 32 bits per pixel)
//! 12      stride*height   pixel rows, same packing as Bitmap
//! ```
//!
//! A file larger than [`MAX_FILE_SIZE`] is refused before any pixel
//! memory is allocated. The file must end exactly after the pixel data.

use alloc::borrow::Cow;

use embedded_io::{Error as _, ErrorKind, Read, ReadExactError, Write};

use super::{geometry, zeroed, Bitmap, BitmapError, Depth};

/// Size of the file header in bytes
pub const HEADER_LEN: usize = 12;

/// Upper bound on header plus pixel data (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Errors from reading or writing bitmap files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Underlying reader or writer failed
    Io(ErrorKind),
    /// Stream ended before the declared size
    ShortRead,
    /// Declared size exceeds [`MAX_FILE_SIZE`]
    TooLarge,
    /// Header fields describe no valid bitmap
    InvalidHeader(BitmapError),
    /// Bytes remain after the declared pixel data
    TrailingData,
    /// Image decoder rejected the input
    Decode,
    /// Pixel buffer allocation failed
    OutOfMemory,
}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoadError::Io(kind) => write!(f, "I/O error: {:?}", kind),
            LoadError::ShortRead => f.write_str("file shorter than its header declares"),
            LoadError::TooLarge => write!(f, "file exceeds {} bytes", MAX_FILE_SIZE),
            LoadError::InvalidHeader(e) => write!(f, "invalid header: {}", e),
            LoadError::TrailingData => f.write_str("unexpected data after pixels"),
            LoadError::Decode => f.write_str("image decoding failed"),
            LoadError::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LoadError {}

impl<E: embedded_io::Error> From<ReadExactError<E>> for LoadError {
    fn from(e: ReadExactError<E>) -> Self {
        match e {
            ReadExactError::UnexpectedEof => LoadError::ShortRead,
            ReadExactError::Other(e) => LoadError::Io(e.kind()),
        }
    }
}

fn read_u32(bytes: &[u8; HEADER_LEN], field: usize) -> u32 {
    let at = field * 4;
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl<'a> Bitmap<'a> {
    /// Adopt statically allocated 1-bit pixel data without copying
    ///
    /// `bits` uses the same row packing as a mono bitmap and must hold at
    /// least `ceil(width / 8) * height` bytes. The bitmap borrows `bits`;
    /// drawing on it switches to a private copy.
    pub fn load_from_resource(width: u32, height: u32, bits: &'a [u8]) -> Result<Self, BitmapError> {
        let (stride, size) = geometry(width, height, Depth::Mono)?;
        let Some(pixels) = bits.get(..size) else {
            warn!(
                "Resource of {=usize} bytes too small for {=u32}x{=u32}",
                bits.len(),
                width,
                height
            );
            return Err(BitmapError::BufferTooSmall);
        };
        Ok(Self {
            width,
            height,
            depth: Depth::Mono,
            stride,
            pixels: Cow::Borrowed(pixels),
            histogram: None,
        })
    }
}

impl Bitmap<'static> {
    /// Parse a bitmap in the pixbus binary format
    ///
    /// The header is validated and the total size checked against
    /// [`MAX_FILE_SIZE`] before the pixel buffer is allocated, so an
    /// oversized or malformed file costs no memory.
    pub fn load_from_file<R: Read>(reader: &mut R) -> Result<Self, LoadError> {
        let mut header = [0u8; HEADER_LEN];
        reader.read_exact(&mut header)?;

        let width = read_u32(&header, 0);
        let height = read_u32(&header, 1);
        let bits = read_u32(&header, 2);

        let depth = Depth::from_bits(bits).map_err(|e| {
            warn!("Bitmap file has unsupported depth {=u32}", bits);
            LoadError::InvalidHeader(e)
        })?;
        if width == 0 || height == 0 {
            return Err(LoadError::InvalidHeader(BitmapError::ZeroDimension));
        }

        let data_len = depth
            .stride(width)
            .checked_mul(height as u64)
            .ok_or(LoadError::TooLarge)?;
        if data_len > MAX_FILE_SIZE - HEADER_LEN as u64 {
            warn!(
                "Bitmap file {=u32}x{=u32}x{=u32} exceeds size limit",
                width,
                height,
                bits
            );
            return Err(LoadError::TooLarge);
        }

        let (stride, size) = geometry(width, height, depth).map_err(LoadError::InvalidHeader)?;
        let mut pixels = zeroed(size).map_err(|_| LoadError::OutOfMemory)?;
        reader.read_exact(&mut pixels)?;

        let mut probe = [0u8; 1];
        match reader.read(&mut probe) {
            Ok(0) => {}
            Ok(_) => return Err(LoadError::TrailingData),
            Err(e) => return Err(LoadError::Io(e.kind())),
        }

        debug!("Loaded {=u32}x{=u32} bitmap, depth {=u32}", width, height, bits);
        Ok(Self {
            width,
            height,
            depth,
            stride,
            pixels: Cow::Owned(pixels),
            histogram: None,
        })
    }

    /// Open and parse a pixbus binary file
    #[cfg(feature = "std")]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path).map_err(|e| LoadError::Io(std_kind(&e)))?;
        Self::load_from_file(&mut StdReader(file))
    }

    /// Decode JPEG data into an RGBA bitmap
    #[cfg(feature = "jpeg")]
    pub fn decode_jpeg(bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            .map_err(|_| LoadError::Decode)?
            .into_rgba8();
        let (width, height) = image.dimensions();
        Bitmap::from_rgba(width, height, image.into_raw()).map_err(LoadError::InvalidHeader)
    }

    /// Read and decode a JPEG file into an RGBA bitmap
    #[cfg(feature = "jpeg")]
    pub fn load_from_jpeg<P: AsRef<std::path::Path>>(path: P) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::Io(std_kind(&e)))?;
        Self::decode_jpeg(&bytes)
    }
}

impl Bitmap<'_> {
    /// Write this bitmap in the pixbus binary format
    pub fn save_to_writer<W: Write>(&self, writer: &mut W) -> Result<(), LoadError> {
        if self.is_empty() {
            return Err(LoadError::InvalidHeader(BitmapError::Empty));
        }
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&self.width.to_le_bytes());
        header[4..8].copy_from_slice(&self.height.to_le_bytes());
        header[8..12].copy_from_slice(&self.depth.bits().to_le_bytes());

        let io = |e: W::Error| LoadError::Io(e.kind());
        writer.write_all(&header).map_err(io)?;
        writer.write_all(&self.pixels).map_err(io)?;
        writer.flush().map_err(io)
    }
}

#[cfg(feature = "std")]
fn std_kind(e: &std::io::Error) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NotFound,
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        std::io::ErrorKind::Interrupted => ErrorKind::Interrupted,
        std::io::ErrorKind::InvalidData => ErrorKind::InvalidData,
        _ => ErrorKind::Other,
    }
}

/// `std::io::Read` seen through `embedded_io::Read`
#[cfg(feature = "std")]
struct StdReader<R>(R);

#[cfg(feature = "std")]
impl<R> embedded_io::ErrorType for StdReader<R> {
    type Error = ErrorKind;
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Read for StdReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        loop {
            match self.0.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => return other.map_err(|e| std_kind(&e)),
            }
        }
    }
}
