//! Board-agnostic core of the pixbus display stack
//!
//! This crate contains everything that does not depend on a particular
//! display controller or platform:
//!
//! - [`bitmap::Bitmap`] - pixel container (packed 1-bit or RGBA), line and
//!   rectangle drawing, loaders for embedded resources, the pixbus binary
//!   format and JPEG files, per-channel histograms
//! - [`surface`] - the two controller framebuffer layouts (page-packed
//!   monochrome and per-pixel 4-bit color) behind one [`surface::Surface`]
//!   capability
//! - [`compositor`] - blends a bitmap into any surface under a [`BlendMode`]
//! - [`ninebit::NineBitFramer`] - packs (control bit, data byte) pairs into
//!   9-byte frames for controllers expecting 9-bit SPI words
//! - [`config`] - panel configuration
//!
//! # Data flow
//!
//! ```text
//! Bitmap ──composite()──► Surface (controller framebuffer) ──► SpiBus
//!                                                   │
//!                                                   └──► NineBitFramer ──► SpiBus
//! ```
//!
//! The crate is `no_std` + `alloc`. The `std` feature adds loading from
//! filesystem paths and the `jpeg` feature adds JPEG decoding.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod fmt;

pub mod bitmap;
pub mod compositor;
pub mod config;
pub mod ninebit;
pub mod surface;

pub use bitmap::{Bitmap, BitmapError, Channel, Depth, LoadError};
pub use compositor::{composite, BlendMode, Palette};
pub use config::{ConfigError, ControllerKind, PanelConfig, SpiSettings};
pub use ninebit::{reverse_bits, NineBitFramer};
pub use surface::{FrameBufferError, NibbleFrameBuffer, PageFrameBuffer, Rgb444, Surface};
