//! Recording stand-ins for the bus, pins and delay

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use pixbus_hal::{BitOrder, Delay, Mode, OutputPin, SpiBus, SpiConfigure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Spi(Vec<u8>),
    Pin(&'static str, bool),
    DelayUs(u32),
    DelayMs(u32),
    Mode(Mode),
    CsActiveHigh(bool),
}

/// Event log shared by all mocks of one test
#[derive(Clone, Default)]
pub struct Log {
    events: Rc<RefCell<Vec<Event>>>,
    fail_spi: Rc<Cell<bool>>,
}

impl Log {
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn fail_spi(&self, fail: bool) {
        self.fail_spi.set(fail);
    }

    /// Concatenation of every SPI write
    pub fn spi_bytes(&self) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Spi(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

pub struct MockSpi {
    log: Log,
}

impl MockSpi {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl SpiBus for MockSpi {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.log.fail_spi.get() {
            return Err(());
        }
        self.log.push(Event::Spi(data.to_vec()));
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), ()> {
        buf.fill(0);
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), ()> {
        self.write(write)?;
        self.read(read)
    }
}

impl SpiConfigure for MockSpi {
    fn set_frequency(&mut self, _hz: u32) -> Result<(), ()> {
        Ok(())
    }

    fn set_mode(&mut self, mode: Mode) -> Result<(), ()> {
        self.log.push(Event::Mode(mode));
        Ok(())
    }

    fn set_bit_order(&mut self, _order: BitOrder) -> Result<(), ()> {
        Ok(())
    }

    fn set_word_bits(&mut self, bits: u8) -> Result<(), ()> {
        if bits == 8 {
            Ok(())
        } else {
            Err(())
        }
    }

    fn set_cs_active_high(&mut self, high: bool) -> Result<(), ()> {
        self.log.push(Event::CsActiveHigh(high));
        Ok(())
    }
}

pub struct MockPin {
    log: Log,
    name: &'static str,
    high: bool,
}

impl MockPin {
    pub fn new(log: &Log, name: &'static str) -> Self {
        Self {
            log: log.clone(),
            name,
            high: false,
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.log.push(Event::Pin(self.name, true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.push(Event::Pin(self.name, false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.log.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(Event::DelayMs(ms));
    }
}
