//! Mock implementations for engine tests
//!
//! Provides a counting pin driver, a recording status sink and helpers to
//! build dispatchers with test-friendly timings.

use rusty_ic::catalog::IcRegistry;
use rusty_ic::config::EmulatorConfig;
use rusty_ic::dispatcher::Dispatcher;
use rusty_ic::pin::{PinDriver, PinMode, PinValue};
use rusty_ic::transport::{MemoryTransport, StatusSink};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Pin driver that remembers every call
#[derive(Debug, Default)]
pub struct MockPinDriver {
    pub modes: HashMap<u8, PinMode>,
    pub levels: HashMap<u8, bool>,
    pub external: HashMap<u8, bool>,
    pub configure_count: usize,
    pub write_count: usize,
    read_count: Cell<usize>,
}

impl MockPinDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_read_count(&self) -> usize {
        self.read_count.get()
    }

    /// Hold a button pin low (pressed) or let the pull-up win.
    pub fn set_button(&mut self, pin: u8, pressed: bool) {
        if pressed {
            self.external.insert(pin, false);
        } else {
            self.external.remove(&pin);
        }
    }

    pub fn level(&self, pin: u8) -> Option<bool> {
        self.levels.get(&pin).copied()
    }
}

impl PinDriver for MockPinDriver {
    fn configure(&mut self, pin: u8, mode: PinMode) {
        self.configure_count += 1;
        self.modes.insert(pin, mode);
    }

    fn write(&mut self, pin: u8, level: bool) {
        self.write_count += 1;
        if self.modes.get(&pin) == Some(&PinMode::Output) {
            self.levels.insert(pin, level);
        }
    }

    fn read(&self, pin: u8) -> PinValue {
        self.read_count.set(self.read_count.get() + 1);
        match self.modes.get(&pin) {
            Some(PinMode::Output) => {
                PinValue::from_bool(self.levels.get(&pin).copied().unwrap_or(false))
            }
            Some(PinMode::InputPullup) => {
                PinValue::from_bool(self.external.get(&pin).copied().unwrap_or(true))
            }
            Some(PinMode::Input) => self
                .external
                .get(&pin)
                .map(|v| PinValue::from_bool(*v))
                .unwrap_or(PinValue::HighZ),
            None => PinValue::HighZ,
        }
    }
}

/// Status sink that keeps every publication
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub published: Arc<Mutex<Vec<(String, Vec<bool>)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(String, Vec<bool>)> {
        self.published.lock().unwrap().last().cloned()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&mut self, ic: &str, gate_outputs: &[bool]) {
        self.published
            .lock()
            .unwrap()
            .push((ic.to_string(), gate_outputs.to_vec()));
    }
}

/// Configuration with no clock settle delay and a slow status broadcast
pub fn test_config() -> EmulatorConfig {
    EmulatorConfig {
        clock_settle_ms: 0,
        status_interval_ms: 60_000,
        ..EmulatorConfig::default()
    }
}

/// Dispatcher on a mock driver with two transports and a sink attached
pub struct Rig {
    pub dispatcher: Dispatcher<MockPinDriver>,
    pub serial: MemoryTransport,
    pub wireless: MemoryTransport,
    pub sink: RecordingSink,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(&test_config())
    }

    pub fn with_config(config: &EmulatorConfig) -> Self {
        Self::with_registry(IcRegistry::builtin().expect("built-in catalog"), config)
    }

    pub fn with_registry(registry: IcRegistry, config: &EmulatorConfig) -> Self {
        let mut dispatcher = Dispatcher::new(registry, MockPinDriver::new(), config);
        let serial = MemoryTransport::new("serial");
        let wireless = MemoryTransport::new("wireless");
        let sink = RecordingSink::new();
        dispatcher.attach_transport(Box::new(serial.clone()));
        dispatcher.attach_transport(Box::new(wireless.clone()));
        dispatcher.attach_sink(Box::new(sink.clone()));
        Rig {
            dispatcher,
            serial,
            wireless,
            sink,
        }
    }

    /// Send a line on the serial transport and return what came back on it.
    pub fn serial_command(&mut self, line: &str) -> Vec<String> {
        self.serial.push_line(line);
        self.dispatcher.tick(std::time::Instant::now());
        self.serial.take_sent()
    }

    pub fn button_pin(&self, button: usize) -> u8 {
        self.dispatcher.board().button_pins[button]
    }

    pub fn set_button(&mut self, button: usize, pressed: bool) {
        let pin = self.button_pin(button);
        self.dispatcher.driver_mut().set_button(pin, pressed);
    }

    pub fn clear_outputs(&self) {
        self.serial.take_sent();
        self.wireless.take_sent();
    }
}

/// Bit string with '1' at the given active indices
pub fn bits(len: usize, ones: &[usize]) -> String {
    (0..len)
        .map(|i| if ones.contains(&i) { '1' } else { '0' })
        .collect()
}
