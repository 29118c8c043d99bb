//! Panel configuration
//!
//! A [`PanelConfig`] describes one attached panel: which controller drives
//! it, its geometry, the SPI device it sits on and the pins it needs.
//! With the `toml` feature a configuration can be read from a file such
//! as:
//!
//! ```toml
//! label = "status"
//! controller = "pcf8833"
//! width = 132
//! height = 132
//! reset_pin = 25
//! foreground = [255, 255, 255]
//! background = [0, 0, 64]
//!
//! [spi]
//! bus = 0
//! device = 1
//! frequency = 4000000
//! ```
//!
//! Missing keys take the values of [`PanelConfig::default`].

use heapless::String;
use pixbus_hal::{Mode, SpiConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// Maximum panel label length
pub const MAX_LABEL_LEN: usize = 16;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing or deserialization failed
    TomlParse,
    /// Width or height is zero or exceeds the controller's limit
    InvalidGeometry,
    /// Monochrome controllers need a height that is a multiple of 8
    HeightNotPageAligned,
    /// SPI mode outside 0..=3
    InvalidSpiMode,
    /// SPI clock frequency of zero
    InvalidFrequency,
    /// Controller needs a data/command pin but none is configured
    MissingDcPin,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::TomlParse => "malformed TOML configuration",
            ConfigError::InvalidGeometry => "panel dimensions out of range",
            ConfigError::HeightNotPageAligned => "panel height must be a multiple of 8",
            ConfigError::InvalidSpiMode => "SPI mode must be 0-3",
            ConfigError::InvalidFrequency => "SPI frequency must be non-zero",
            ConfigError::MissingDcPin => "controller requires a DC pin",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Display controller chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ControllerKind {
    /// Monochrome OLED, page-packed RAM, 4-wire SPI with DC pin
    #[default]
    Ssd1306,
    /// 12-bit color LCD, 9-bit 3-wire SPI
    Pcf8833,
}

impl ControllerKind {
    /// Largest panel the controller can address, (width, height)
    pub const fn max_dimensions(self) -> (u32, u32) {
        match self {
            ControllerKind::Ssd1306 => (128, 64),
            ControllerKind::Pcf8833 => (132, 132),
        }
    }

    /// True for controllers with page-packed monochrome RAM
    pub const fn is_monochrome(self) -> bool {
        matches!(self, ControllerKind::Ssd1306)
    }
}

/// SPI device settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpiSettings {
    pub bus: u32,
    /// Chip select index on the bus
    pub device: u32,
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SPI mode 0-3
    pub mode: u8,
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self {
            bus: 0,
            device: 0,
            frequency: 1_000_000,
            mode: 0,
        }
    }
}

impl SpiSettings {
    /// Bus configuration for these settings
    ///
    /// `None` if `mode` is not a valid SPI mode.
    pub fn spi_config(&self) -> Option<SpiConfig> {
        Some(SpiConfig {
            frequency: self.frequency,
            mode: Mode::from_u8(self.mode)?,
            ..SpiConfig::default()
        })
    }
}

/// One attached panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PanelConfig {
    /// Free-form name used in log messages
    pub label: String<MAX_LABEL_LEN>,
    pub controller: ControllerKind,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub spi: SpiSettings,
    /// Data/command select pin, required by 4-wire controllers
    pub dc_pin: Option<u32>,
    /// Hardware reset pin
    pub reset_pin: Option<u32>,
    /// Row 0 at the top of the glass (false: mirrored vertically)
    pub y_origin_top: bool,
    /// Color of set pixels of monochrome images
    pub foreground: [u8; 3],
    /// Color painted behind images and on clear
    pub background: [u8; 3],
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            controller: ControllerKind::Ssd1306,
            width: 64,
            height: 48,
            spi: SpiSettings::default(),
            dc_pin: Some(24),
            reset_pin: Some(25),
            y_origin_top: true,
            foreground: [0xFF, 0xFF, 0xFF],
            background: [0x00, 0x00, 0x00],
        }
    }
}

impl PanelConfig {
    /// Check the configuration against the controller's limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (max_width, max_height) = self.controller.max_dimensions();
        if self.width == 0 || self.height == 0 || self.width > max_width || self.height > max_height {
            warn!(
                "Panel {=u32}x{=u32} out of range for {}",
                self.width,
                self.height,
                self.controller
            );
            return Err(ConfigError::InvalidGeometry);
        }
        if self.controller.is_monochrome() {
            if self.height % 8 != 0 {
                return Err(ConfigError::HeightNotPageAligned);
            }
            if self.dc_pin.is_none() {
                return Err(ConfigError::MissingDcPin);
            }
        }
        if self.spi.mode > 3 {
            return Err(ConfigError::InvalidSpiMode);
        }
        if self.spi.frequency == 0 {
            return Err(ConfigError::InvalidFrequency);
        }
        Ok(())
    }

    /// Parse and validate a TOML panel description
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig = toml::from_str(input).map_err(|_e| {
            warn!("Panel config is not valid TOML");
            ConfigError::TomlParse
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PanelConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!((config.width, config.height), (64, 48));
    }

    #[test]
    fn test_ssd1306_height_alignment() {
        let config = PanelConfig {
            height: 50,
            ..PanelConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::HeightNotPageAligned));
    }

    #[test]
    fn test_pcf8833_limits() {
        let mut config = PanelConfig {
            controller: ControllerKind::Pcf8833,
            width: 132,
            height: 132,
            dc_pin: None,
            ..PanelConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));

        config.width = 133;
        assert_eq!(config.validate(), Err(ConfigError::InvalidGeometry));
    }

    #[test]
    fn test_zero_geometry() {
        let config = PanelConfig {
            width: 0,
            ..PanelConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidGeometry));
    }

    #[test]
    fn test_ssd1306_requires_dc_pin() {
        let config = PanelConfig {
            dc_pin: None,
            ..PanelConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingDcPin));
    }

    #[test]
    fn test_spi_settings() {
        let spi = SpiSettings {
            frequency: 8_000_000,
            mode: 3,
            ..SpiSettings::default()
        };
        let bus = spi.spi_config().unwrap();
        assert_eq!(bus.frequency, 8_000_000);
        assert_eq!(bus.mode, Mode::Mode3);

        let bad = SpiSettings { mode: 4, ..spi };
        assert!(bad.spi_config().is_none());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml() {
        let config = PanelConfig::from_toml(
            r#"
            label = "status"
            controller = "pcf8833"
            width = 132
            height = 130
            reset_pin = 7
            background = [0, 0, 64]

            [spi]
            bus = 1
            frequency = 4000000
            "#,
        )
        .unwrap();

        assert_eq!(config.label.as_str(), "status");
        assert_eq!(config.controller, ControllerKind::Pcf8833);
        assert_eq!((config.width, config.height), (132, 130));
        assert_eq!(config.reset_pin, Some(7));
        assert_eq!(config.background, [0, 0, 64]);
        assert_eq!(config.spi.bus, 1);
        assert_eq!(config.spi.device, 0);
        assert_eq!(config.spi.frequency, 4_000_000);
        assert_eq!(config.foreground, [0xFF, 0xFF, 0xFF]);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_from_toml_rejects_invalid() {
        assert_eq!(
            PanelConfig::from_toml("width = \"wide\""),
            Err(ConfigError::TomlParse)
        );
        assert_eq!(
            PanelConfig::from_toml("controller = \"ssd1306\"\nheight = 12"),
            Err(ConfigError::HeightNotPageAligned)
        );
        assert_eq!(
            PanelConfig::from_toml("[spi]\nmode = 9"),
            Err(ConfigError::InvalidSpiMode)
        );
    }
}
