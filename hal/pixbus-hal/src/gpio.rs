//! GPIO pin abstractions
//!
//! Provides traits for the digital pins a controller needs (data/command
//! select, reset, busy lines). Direction is fixed by the trait a pin
//! implements; platform code configures the hardware before handing the
//! pin to a driver.

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level
    pub fn toggle(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Edge that triggers an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
    Both,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific platform.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Toggle the pin state
    fn toggle(&mut self) {
        let level = Level::from(self.is_set_high()).toggle();
        self.set_level(level);
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Read the current level
    fn level(&self) -> Level {
        Level::from(self.is_high())
    }
}

/// Input pin that can call a handler on an edge
pub trait InterruptPin: InputPin {
    /// Error type for interrupt registration
    type Error;

    /// Register `handler` to be called when `edge` is seen
    ///
    /// The handler runs in whatever context the platform delivers the
    /// interrupt in; it must not block.
    fn on_edge(&mut self, edge: Edge, handler: fn()) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePin {
        high: bool,
    }

    impl OutputPin for FakePin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    impl InputPin for FakePin {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_level_toggle() {
        assert_eq!(Level::Low.toggle(), Level::High);
        assert_eq!(Level::High.toggle(), Level::Low);
    }

    #[test]
    fn test_output_toggle() {
        let mut pin = FakePin { high: false };
        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(!pin.is_set_high());
    }

    #[test]
    fn test_set_level_and_read_back() {
        let mut pin = FakePin { high: false };
        pin.set_level(Level::High);
        assert_eq!(pin.level(), Level::High);
        pin.set_level(Level::Low);
        assert_eq!(pin.level(), Level::Low);
    }
}
