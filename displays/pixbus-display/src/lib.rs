//! Display controller drivers for pixbus
//!
//! This crate provides:
//! - `DisplayBackend` trait shared by all controllers
//! - `Ssd1306` - monochrome OLED, page-packed RAM, 4-wire SPI
//! - `Pcf8833` - 12-bit color LCD (Nokia 6100), 9-bit 3-wire SPI
//!
//! # Architecture
//!
//! Each driver owns a framebuffer from `pixbus-core` in its controller's
//! native layout. Images are composited into that buffer with
//! `write_image` and sent to the panel with `display`:
//!
//! ```text
//! Bitmap ──write_image()──► framebuffer ──display()──► SpiBus
//! ```
//!
//! Drivers only see the `pixbus-hal` traits, so the same code runs against
//! a Linux spidev, a microcontroller HAL or the test mocks.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

mod fmt;

pub mod backend;
pub mod pcf8833;
pub mod ssd1306;

#[cfg(test)]
mod mock;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use pcf8833::Pcf8833;
pub use ssd1306::Ssd1306;
