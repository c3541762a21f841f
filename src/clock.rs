use crate::pin::PinDriver;
use log::debug;
use std::thread;
use std::time::Duration;

pub const PULSE_EVENT: &str = "CLOCK:PULSE_GENERATED";

/// Single-shot clock pulse on one controller pin.
///
/// The pulse is low, high, low with `settle` held after each of the first two
/// edges. The caller blocks for the whole pulse.
#[derive(Debug, Clone, Copy)]
pub struct PulseGenerator {
    settle: Duration,
}

impl PulseGenerator {
    pub fn new(settle: Duration) -> Self {
        PulseGenerator { settle }
    }

    pub fn pulse(&self, driver: &mut dyn PinDriver, pin: u8) -> &'static str {
        driver.write(pin, false);
        self.hold();
        driver.write(pin, true);
        self.hold();
        driver.write(pin, false);
        debug!("Clock pulse on pin {}", pin);
        PULSE_EVENT
    }

    fn hold(&self) {
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
    }
}

impl Default for PulseGenerator {
    fn default() -> Self {
        PulseGenerator::new(Duration::from_millis(5))
    }
}
