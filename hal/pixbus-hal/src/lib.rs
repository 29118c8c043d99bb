//! pixbus Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits a display controller driver
//! needs from its platform: a byte-oriented serial bus, digital pins and a
//! blocking timer. Platform crates (Linux spidev, microcontroller HALs, test
//! mocks) implement them; the drivers in `pixbus-display` only ever talk to
//! these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Controller drivers (pixbus-display)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pixbus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ platform impl │       │ embedded-hal  │
//! │  (spidev...)  │       │   adapters    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`spi::SpiBus`], [`spi::SpiConfigure`], [`spi::SpiOpen`] - Serial bus transport
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::InterruptPin`] - Digital I/O
//! - [`delay::Delay`] - Blocking sleeps
//!
//! Everything is synchronous. A call that touches the bus blocks until the
//! transfer is finished; there is no cancellation.

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(feature = "embedded-hal", test))]
pub mod compat;
pub mod delay;
pub mod gpio;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::Delay;
pub use gpio::{Edge, InputPin, InterruptPin, Level, OutputPin};
pub use spi::{BitOrder, Mode, SpiBus, SpiConfig, SpiConfigure, SpiOpen};
