//! SSD1306 OLED Display Driver
//!
//! Driver for small SSD1306 monochrome OLEDs on 4-wire SPI: a DC pin
//! selects command (low) or data (high) and a reset pin doubles as power
//! enable. Display RAM is organised in 8-row pages, one byte per column,
//! which is exactly the layout of [`PageFrameBuffer`].
//!
//! Panels narrower than the controller's 128 columns are wired to the
//! middle of the column range, so column addresses are offset by
//! `(128 - width) / 2`.

use pixbus_core::{
    composite, Bitmap, BlendMode, ConfigError, ControllerKind, PageFrameBuffer, Palette,
    PanelConfig, Surface,
};
use pixbus_hal::{Delay, OutputPin, SpiBus, SpiConfig, SpiConfigure};

use crate::backend::{DisplayBackend, DisplayError};

/// Controller column count
const MAX_WIDTH: u32 = 128;

/// Controller row count
const MAX_HEIGHT: u32 = 64;

/// SSD1306 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const RESUME_FROM_RAM: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// SSD1306 OLED driver
pub struct Ssd1306<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    reset: RST,
    delay: D,
    /// Frame buffer (1 bit per pixel, organised as pages)
    buffer: PageFrameBuffer,
    column_offset: u8,
    /// Row 0 at the top of the glass
    y_origin_top: bool,
    bus_config: SpiConfig,
}

impl<SPI, DC, RST, D> Ssd1306<SPI, DC, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    D: Delay,
{
    /// Create a driver for a `width` x `height` panel
    ///
    /// The height must be a multiple of 8. No bus traffic happens until
    /// [`initialise`](DisplayBackend::initialise). Row 0 starts at the
    /// bottom of the glass and the bus settings are the [`SpiConfig`]
    /// defaults.
    pub fn new(
        spi: SPI,
        dc: DC,
        reset: RST,
        delay: D,
        width: u32,
        height: u32,
    ) -> Result<Self, DisplayError<SPI::Error>> {
        if width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(DisplayError::InvalidDimensions);
        }
        let buffer = PageFrameBuffer::new(width, height)?;
        Ok(Self {
            spi,
            dc,
            reset,
            delay,
            buffer,
            column_offset: ((MAX_WIDTH - width) / 2) as u8,
            y_origin_top: false,
            bus_config: SpiConfig::default(),
        })
    }

    /// Create a driver from a panel configuration
    ///
    /// The y origin is applied by [`initialise`](DisplayBackend::initialise)
    /// and the SPI settings by [`configure_bus`](Self::configure_bus).
    pub fn from_config(
        config: &PanelConfig,
        spi: SPI,
        dc: DC,
        reset: RST,
        delay: D,
    ) -> Result<Self, DisplayError<SPI::Error>> {
        if config.controller != ControllerKind::Ssd1306 {
            return Err(DisplayError::WrongController);
        }
        config.validate()?;
        let bus_config = config
            .spi
            .spi_config()
            .ok_or(DisplayError::Config(ConfigError::InvalidSpiMode))?;
        let mut oled = Self::new(spi, dc, reset, delay, config.width, config.height)?;
        oled.y_origin_top = config.y_origin_top;
        oled.bus_config = bus_config;
        Ok(oled)
    }

    /// Apply the panel's SPI settings to the bus
    pub fn configure_bus(&mut self) -> Result<(), DisplayError<SPI::Error>>
    where
        SPI: SpiConfigure,
    {
        let config = self.bus_config;
        self.spi.configure(&config).map_err(DisplayError::Bus)
    }

    /// Framebuffer contents, not necessarily on the panel yet
    pub fn framebuffer(&self) -> &PageFrameBuffer {
        &self.buffer
    }

    /// Give back the bus, pins and delay
    pub fn release(self) -> (SPI, DC, RST, D) {
        (self.spi, self.dc, self.reset, self.delay)
    }

    /// Send a command byte
    fn command(&mut self, byte: u8) -> Result<(), DisplayError<SPI::Error>> {
        self.dc.set_low();
        self.spi.write_byte(byte).map_err(|e| {
            error!("SSD1306 command {=u8:#x} failed", byte);
            DisplayError::Bus(e)
        })
    }

    fn commands(&mut self, bytes: &[u8]) -> Result<(), DisplayError<SPI::Error>> {
        for &b in bytes {
            self.command(b)?;
        }
        Ok(())
    }

    /// Send display RAM data
    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError<SPI::Error>> {
        self.dc.set_high();
        self.spi.write(bytes).map_err(|e| {
            error!("SSD1306 data write failed");
            DisplayError::Bus(e)
        })
    }

    /// Point the RAM write cursor at column 0 of `page`
    fn start_page(&mut self, page: u8) -> Result<(), DisplayError<SPI::Error>> {
        let col = self.column_offset;
        self.commands(&[
            cmd::SET_HIGH_COLUMN | (col >> 4),
            cmd::SET_LOW_COLUMN | (col & 0x0F),
            cmd::SET_PAGE_ADDR | page,
        ])
    }

    /// Light every pixel, bypassing the framebuffer
    pub fn show_all_pixels(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        let width = self.buffer.width();
        for page in 0..self.buffer.pages() as u8 {
            self.start_page(page)?;
            for _ in 0..width {
                self.data(&[0xFF])?;
            }
        }
        Ok(())
    }
}

fn com_scan(top: bool) -> u8 {
    if top {
        cmd::SET_COM_SCAN_DEC
    } else {
        cmd::SET_COM_SCAN_INC
    }
}

impl<SPI, DC, RST, D> DisplayBackend for Ssd1306<SPI, DC, RST, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    D: Delay,
{
    type BusError = SPI::Error;

    fn initialise(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.dc.set_high();
        self.reset.set_low();
        self.delay.delay_ms(100);

        // Reset pulse
        self.reset.set_high();
        self.delay.delay_ms(5);
        self.reset.set_low();
        self.delay.delay_ms(10);
        self.reset.set_high();

        let mux = (self.buffer.height() - 1) as u8;
        let com_scan = com_scan(self.y_origin_top);
        self.commands(&[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80, // Default clock, no divide
            cmd::SET_MUX_RATIO,
            mux,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14, // Enable charge pump
            cmd::SET_NORMAL,
            cmd::RESUME_FROM_RAM,
            cmd::SET_MEMORY_MODE,
            0x10, // Page addressing
            cmd::SET_SEG_REMAP,
            com_scan,
            cmd::SET_COM_PINS,
            0x12, // Alternative COM config
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::DISPLAY_ON,
        ])?;
        self.delay.delay_ms(100);

        info!(
            "SSD1306 initialised, {=u32}x{=u32}",
            self.buffer.width(),
            self.buffer.height()
        );
        Ok(())
    }

    fn write_image(&mut self, image: &Bitmap<'_>, mode: BlendMode, x_offset: i32, y_offset: i32) {
        composite(&mut self.buffer, image, mode, x_offset, y_offset, &Palette::MONO);
    }

    fn display(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        for page in 0..self.buffer.pages() {
            self.start_page(page as u8)?;
            self.dc.set_high();
            let bytes = self.buffer.page(page).unwrap_or(&[]);
            self.spi.write(bytes).map_err(|e| {
                error!("SSD1306 page {=u32} write failed", page);
                DisplayError::Bus(e)
            })?;
        }
        debug!("SSD1306 flushed {=u32} pages", self.buffer.pages());
        Ok(())
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn turn_on(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.reset.set_low();
        self.delay.delay_us(100);
        self.reset.set_high();
        self.command(cmd::DISPLAY_ON)
    }

    fn turn_off(&mut self) -> Result<(), DisplayError<SPI::Error>> {
        self.command(cmd::DISPLAY_OFF)?;
        self.delay.delay_ms(100);
        self.reset.set_low();
        Ok(())
    }

    fn set_y_origin(&mut self, top: bool) -> Result<(), DisplayError<SPI::Error>> {
        self.y_origin_top = top;
        self.command(com_scan(top))
    }

    fn pixel_dimensions(&self) -> (u32, u32) {
        (self.buffer.width(), self.buffer.height())
    }
}
