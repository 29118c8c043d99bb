//! SPI bus abstractions
//!
//! Provides the transport a display controller is driven over. One bus
//! handle addresses exactly one device (one chip select); sharing a
//! physical bus between controllers is the caller's problem.

/// SPI bus master bound to a single device
///
/// Provides blocking transfer operations. Implementations report failure
/// through `Self::Error` and never retry internally.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write(&[byte])
    }

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (clocks out zeros)
    ///
    /// The number of bytes read matches `buf.len()`.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;
}

/// Runtime configuration of an open bus
///
/// Most platform drivers only implement part of this; an unsupported
/// setting should be reported as an error rather than silently ignored.
pub trait SpiConfigure: SpiBus {
    /// Set the clock frequency in Hz
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Set clock polarity and phase
    fn set_mode(&mut self, mode: Mode) -> Result<(), Self::Error>;

    /// Set the bit order on the wire
    fn set_bit_order(&mut self, order: BitOrder) -> Result<(), Self::Error>;

    /// Set the word width in bits
    fn set_word_bits(&mut self, bits: u8) -> Result<(), Self::Error>;

    /// Set whether chip select is asserted high
    fn set_cs_active_high(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Apply a complete configuration
    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error> {
        self.set_mode(config.mode)?;
        self.set_bit_order(config.bit_order)?;
        self.set_word_bits(config.word_bits)?;
        self.set_cs_active_high(config.cs_active_high)?;
        self.set_frequency(config.frequency)
    }
}

/// Bus that can be opened by bus and device number
///
/// On Linux this maps to `/dev/spidev<bus>.<device>`.
pub trait SpiOpen: SpiBus + Sized {
    /// Open the device on the given bus
    fn open(bus: u32, device: u32) -> Result<Self, Self::Error>;
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Bit order on the wire
    pub bit_order: BitOrder,
    /// Bits per word
    pub word_bits: u8,
    /// Chip select asserted high
    pub cs_active_high: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            mode: Mode::Mode0,
            bit_order: BitOrder::MsbFirst,
            word_bits: 8,
            cs_active_high: false,
        }
    }
}

/// Bit order on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Mode from its numeric form (0-3)
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }

    /// Numeric form as used by spidev (`SPI_MODE_n`)
    pub fn as_u8(self) -> u8 {
        match self {
            Mode::Mode0 => 0,
            Mode::Mode1 => 1,
            Mode::Mode2 => 2,
            Mode::Mode3 => 3,
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
