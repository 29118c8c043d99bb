//! Adapters from `embedded-hal` 1.0 peripherals
//!
//! Lets any platform with an `embedded-hal` implementation drive pixbus
//! controllers without writing trait impls by hand.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use embedded_hal::spi::SpiDevice;

use crate::delay::Delay;
use crate::gpio::{InputPin, OutputPin};
use crate::spi::SpiBus;

/// [`SpiBus`] over an `embedded-hal` SPI device
pub struct EhSpi<D>(pub D);

impl<D: SpiDevice> SpiBus for EhSpi<D> {
    type Error = D::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        SpiDevice::write(&mut self.0, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        SpiDevice::read(&mut self.0, buf)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        SpiDevice::transfer(&mut self.0, read, write)
    }
}

/// [`OutputPin`] over an `embedded-hal` output pin
///
/// The driven level is tracked locally. Pin errors are dropped since the
/// pixbus output trait is infallible.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin> EhOutput<P> {
    /// Wrap a pin, driving it low
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// [`InputPin`] over an `embedded-hal` input pin
///
/// A read error reads as low.
pub struct EhInput<P>(RefCell<P>);

impl<P: digital::InputPin> EhInput<P> {
    pub fn new(pin: P) -> Self {
        Self(RefCell::new(pin))
    }
}

impl<P: digital::InputPin> InputPin for EhInput<P> {
    fn is_high(&self) -> bool {
        self.0.borrow_mut().is_high().unwrap_or(false)
    }
}

/// [`Delay`] over an `embedded-hal` delay provider
pub struct EhDelay<D>(pub D);

impl<D: DelayNs> Delay for EhDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
