//! Blocking delay abstraction

/// Blocking sleep provider
///
/// Controllers use this for reset pulses and power-up settling times.
pub trait Delay {
    /// Sleep for at least `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Sleep for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}
