//! PCF8833 color LCD driver
//!
//! The PCF8833 (Nokia 6100 LCD) has no DC pin. Each byte on its 3-wire
//! SPI carries a leading flag bit instead, 0 for commands and 1 for data,
//! so every transfer goes through a [`NineBitFramer`]. Each command group
//! is terminated by flushing the framer with NOP words.
//!
//! Pixels are sent in 12-bit color mode: two pixels in three bytes,
//! produced by [`NibbleFrameBuffer::packed`].

use pixbus_core::{
    composite, Bitmap, BlendMode, ConfigError, ControllerKind, NibbleFrameBuffer, NineBitFramer,
    Palette, PanelConfig, Rgb444, Surface,
};
use pixbus_hal::{Delay, OutputPin, SpiBus, SpiConfig, SpiConfigure};

use crate::backend::{DisplayBackend, DisplayError};

/// Largest addressable panel edge in pixels
pub const MAX_DIMENSION: u32 = 132;

/// Reset pulse and power-up settle time
const RESET_HOLD_MS: u32 = 2000;

/// Booster settle time after sleep-out
const POWER_UP_MS: u32 = 1000;

/// PCF8833 commands
#[allow(dead_code)]
mod cmd {
    pub const NOP: u8 = 0x00;
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const BOOSTER_ON: u8 = 0x03;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const SET_CONTRAST: u8 = 0x25;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const COLUMN_ADDR_SET: u8 = 0x2A;
    pub const PAGE_ADDR_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_ACCESS_CTL: u8 = 0x36;
    pub const PIXEL_FORMAT: u8 = 0x3A;
}

/// COLMOD value for 12 bits per pixel
const PIXEL_FORMAT_12BIT: u8 = 0x03;

/// MADCTL: no mirroring, RGB order, rows top to bottom
const MADCTL_DEFAULT: u8 = 0x10;

/// MADCTL bit mirroring the row order
const MADCTL_MIRROR_Y: u8 = 0x80;

const CONTRAST: u8 = 0x3F;

/// PCF8833 LCD driver
pub struct Pcf8833<SPI, RST, D> {
    spi: SPI,
    reset: RST,
    delay: D,
    framer: NineBitFramer,
    /// Frame buffer (one nibble per channel)
    buffer: NibbleFrameBuffer,
    madctl: u8,
    foreground: Rgb444,
    background: Rgb444,
    bus_config: SpiConfig,
}

impl<SPI, RST, D> Pcf8833<SPI, RST, D>
where
    SPI: SpiBus,
    RST: OutputPin,
    D: Delay,
{
    /// Create a driver for a `width` x `height` panel
    ///
    /// Defaults to white images on a red background, unmirrored rows and
    /// the [`SpiConfig`] defaults on the bus.
    pub fn new(
        spi: SPI,
        reset: RST,
        delay: D,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError<SPI::Error>> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DisplayError::InvalidDimensions);
        }
        let buffer = NibbleFrameBuffer::new(width, height)?;
        Ok(Self {
            spi,
            reset,
            delay,
            framer: NineBitFramer::new(),
            buffer,
            madctl: MADCTL_DEFAULT,
            foreground: Rgb444::WHITE,
            background: Rgb444::new(0xF, 0x0, 0x0),
            bus_config: SpiConfig::default(),
        })
    }

    /// Create a driver from a panel configuration
    ///
    /// Colors are taken from the configuration. The y origin is applied by
    /// [`initialise`](DisplayBackend::initialise) and the SPI settings by
    /// [`configure_bus`](Self::configure_bus).
    pub fn from_config(
        config: &PanelConfig,
        spi: SPI,
        reset: RST,
        delay: D,
    ) -> Result<Self, DisplayError<SPI::Error>> {
        if config.controller != ControllerKind::Pcf8833 {
            return Err(DisplayError::WrongController);
        }
        config.validate()?;
        let bus_config = config
            .spi
            .spi_config()
            .ok_or(DisplayError::Config(ConfigError::InvalidSpiMode))?;
        let mut lcd = Self::new(spi, reset, delay, config.width, config.height)?;
        lcd.set_foreground(Rgb444::from_rgb888(config.foreground));
        lcd.set_background(Rgb444::from_rgb888(config.background));
        lcd.madctl = with_y_origin(lcd.madctl, config.y_origin_top);
        lcd.bus_config = bus_config;
        Ok(lcd)
    }

    /// Color of set pixels in mono images
    pub fn set_foreground(&mut self, color: Rgb444) {
        self.foreground = color;
    }

    /// Color for [`clear`](DisplayBackend::clear) and unset pixels in
    /// Overwrite mode
    pub fn set_background(&mut self, color: Rgb444) {
        self.background = color;
    }

    pub fn framebuffer(&self) -> &NibbleFrameBuffer {
        &self.buffer
    }

    /// Give back the bus, reset pin and delay
    pub fn release(self) -> (SPI, RST, D) {
        (self.spi, self.reset, self.delay)
    }

    /// Apply the panel's SPI settings to the bus
    ///
    /// 9-bit words travel as packed 8-bit frames, so the bus always runs
    /// 8-bit words whatever the settings.
    pub fn configure_bus(&mut self) -> Result<(), DisplayError<SPI::Error>>
    where
        SPI: SpiConfigure,
    {
        let config = SpiConfig {
            word_bits: 8,
            ..self.bus_config
        };
        self.spi.configure(&config).map_err(DisplayError::Bus)
    }

    fn word(&mut self, control: bool, byte: u8) -> Result<(), DisplayError<SPI::Error>> {
        self.framer.push(&mut self.spi, control, byte).map_err(|e| {
            error!("PCF8833 frame write failed");
            DisplayError::Bus(e)
        })
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError<SPI::Error>> {
        self.word(false, byte)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError<SPI::Error>> {
        self.word(true, byte)
    }

    /// Pad and send the pending frame
    fn end_group(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.framer
            .flush(&mut self.spi, false, cmd::NOP)
            .map_err(DisplayError::Bus)
    }
}

/// MADCTL value with the row mirror bit set for a top origin
fn with_y_origin(madctl: u8, top: bool) -> u8 {
    if top {
        madctl | MADCTL_MIRROR_Y
    } else {
        madctl & !MADCTL_MIRROR_Y
    }
}

impl<SPI, RST, D> DisplayBackend for Pcf8833<SPI, RST, D>
where
    SPI: SpiBus,
    RST: OutputPin,
    D: Delay,
{
    type BusError = SPI::Error;

    fn initialise(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.reset.set_low();
        self.delay.delay_ms(RESET_HOLD_MS);
        self.reset.set_high();
        self.delay.delay_ms(RESET_HOLD_MS);

        self.command(cmd::SLEEP_OUT)?;
        self.command(cmd::BOOSTER_ON)?;
        self.command(cmd::INVERSION_OFF)?;

        self.command(cmd::PIXEL_FORMAT)?;
        self.data(PIXEL_FORMAT_12BIT)?;

        let madctl = self.madctl;
        self.command(cmd::MEMORY_ACCESS_CTL)?;
        self.data(madctl)?;

        self.command(cmd::SET_CONTRAST)?;
        self.data(CONTRAST)?;

        self.delay.delay_ms(RESET_HOLD_MS);
        self.command(cmd::DISPLAY_ON)?;
        self.end_group()?;

        info!(
            "PCF8833 initialised, {=u32}x{=u32}",
            self.buffer.width(),
            self.buffer.height()
        );
        Ok(())
    }

    fn write_image(&mut self, image: &Bitmap<'_>, mode: BlendMode, x_offset: i32, y_offset: i32) {
        let palette = Palette::new(self.foreground, self.background);
        composite(&mut self.buffer, image, mode, x_offset, y_offset, &palette);
    }

    fn display(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        let last_column = (self.buffer.width() - 1) as u8;
        let last_row = (self.buffer.height() - 1) as u8;

        self.command(cmd::COLUMN_ADDR_SET)?;
        self.data(0)?;
        self.data(last_column)?;

        self.command(cmd::PAGE_ADDR_SET)?;
        self.data(0)?;
        self.data(last_row)?;

        self.command(cmd::MEMORY_WRITE)?;
        for byte in self.buffer.packed() {
            self.framer
                .push(&mut self.spi, true, byte)
                .map_err(DisplayError::Bus)?;
        }
        self.end_group()?;

        debug!("PCF8833 flushed {=usize} bytes", self.buffer.as_bytes().len());
        Ok(())
    }

    fn clear(&mut self) {
        self.buffer.fill(self.background);
    }

    fn turn_on(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.command(cmd::SLEEP_OUT)?;
        self.command(cmd::BOOSTER_ON)?;
        self.delay.delay_ms(POWER_UP_MS);
        self.command(cmd::DISPLAY_ON)?;
        self.end_group()
    }

    fn turn_off(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.command(cmd::DISPLAY_OFF)?;
        self.command(cmd::SLEEP_IN)?;
        self.end_group()
    }

    fn set_y_origin(&mut self, top: bool) -> Result<(), DisplayError<SPI::Error>> {
        self.madctl = with_y_origin(self.madctl, top);
        let madctl = self.madctl;
        self.command(cmd::MEMORY_ACCESS_CTL)?;
        self.data(madctl)?;
        self.end_group()
    }

    fn pixel_dimensions(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }
}
