use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;

/// Byte addressable, non-volatile storage the log lives in, e.g. the EEPROM of an AVR.
///
/// Any `embedded_storage::Storage` qualifies. Reads and writes may start at arbitrary offsets
/// and have arbitrary lengths, the device is expected to persist every written byte across
/// power loss.
pub trait Platform: Storage {}

impl<T: Storage> Platform for T {}

/// Source of the two raw analog readings that make up one sample.
pub trait Sampler {
    fn sample(&mut self) -> (i16, i16);
}

impl<S: Sampler> Sampler for &mut S {
    fn sample(&mut self) -> (i16, i16) {
        (*self).sample()
    }
}

/// Suspends execution for one fixed, non-cancelable time quantum, typically a low power
/// idle state that is left by the watchdog.
pub trait Sleep {
    fn sleep_quantum(&mut self);
}

impl<S: Sleep> Sleep for &mut S {
    fn sleep_quantum(&mut self) {
        (*self).sleep_quantum()
    }
}

/// Length of a single sleep quantum used by [`DelaySleep::new`].
pub const DEFAULT_SLEEP_QUANTUM_MS: u32 = 8_000;

/// Implements [`Sleep`] on top of a plain `DelayNs`. Useful on targets without a dedicated
/// low power mode and for bring-up.
pub struct DelaySleep<D> {
    delay: D,
    quantum_ms: u32,
}

impl<D: DelayNs> DelaySleep<D> {
    pub fn new(delay: D) -> Self {
        Self::with_quantum(delay, DEFAULT_SLEEP_QUANTUM_MS)
    }

    pub fn with_quantum(delay: D, quantum_ms: u32) -> Self {
        Self { delay, quantum_ms }
    }

    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> Sleep for DelaySleep<D> {
    fn sleep_quantum(&mut self) {
        self.delay.delay_ms(self.quantum_ms);
    }
}
