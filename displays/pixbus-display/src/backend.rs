//! Display backend trait
//!
//! Common interface of the controller drivers. A driver owns its bus,
//! pins and framebuffer; images are composited into the framebuffer and
//! only reach the glass on [`DisplayBackend::display`].

use pixbus_core::{Bitmap, BlendMode, ConfigError, FrameBufferError};

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Bus transfer failed
    Bus(E),
    /// Panel size not supported by the controller
    InvalidDimensions,
    /// Framebuffer allocation failed
    OutOfMemory,
    /// Configuration names a different controller
    WrongController,
    /// Panel configuration failed validation
    Config(ConfigError),
}

impl<E> From<FrameBufferError> for DisplayError<E> {
    fn from(e: FrameBufferError) -> Self {
        match e {
            FrameBufferError::OutOfMemory => DisplayError::OutOfMemory,
            FrameBufferError::ZeroDimension
            | FrameBufferError::HeightNotPageAligned
            | FrameBufferError::TooLarge => DisplayError::InvalidDimensions,
        }
    }
}

impl<E> From<ConfigError> for DisplayError<E> {
    fn from(e: ConfigError) -> Self {
        DisplayError::Config(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for DisplayError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Bus(e) => write!(f, "bus error: {:?}", e),
            DisplayError::InvalidDimensions => f.write_str("unsupported panel dimensions"),
            DisplayError::OutOfMemory => f.write_str("framebuffer allocation failed"),
            DisplayError::WrongController => f.write_str("configuration is for another controller"),
            DisplayError::Config(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

/// Display backend trait
///
/// Provides a hardware-agnostic interface over the supported controllers.
pub trait DisplayBackend {
    /// Error type of the underlying bus
    type BusError;

    /// Reset the controller and run its power-up sequence
    fn initialise(&mut self) -> Result<(), DisplayError<Self::BusError>>;

    /// Blend `image` into the framebuffer at the given offset
    ///
    /// Nothing is sent to the panel until [`display`](Self::display).
    fn write_image(&mut self, image: &Bitmap<'_>, mode: BlendMode, x_offset: i32, y_offset: i32);

    /// Send the framebuffer to the panel
    fn display(&mut self) -> Result<(), DisplayError<Self::BusError>>;

    /// Reset the framebuffer to the background
    fn clear(&mut self);

    fn turn_on(&mut self) -> Result<(), DisplayError<Self::BusError>>;

    /// Switch the panel off; display RAM keeps its contents
    fn turn_off(&mut self) -> Result<(), DisplayError<Self::BusError>>;

    /// Place row 0 at the top (`true`) or bottom of the glass
    fn set_y_origin(&mut self, top: bool) -> Result<(), DisplayError<Self::BusError>>;

    /// Panel size in pixels, (width, height)
    fn pixel_dimensions(&self) -> (u32, u32);
}
