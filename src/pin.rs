use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinValue {
    Low,
    High,
    HighZ, // Floating
}

impl PinValue {
    pub fn to_str(&self) -> &'static str {
        match self {
            PinValue::Low => "Low",
            PinValue::High => "High",
            PinValue::HighZ => "HighZ",
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PinValue::High
        } else {
            PinValue::Low
        }
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Electrical/logical function of one package pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinRole {
    #[serde(rename = "VCC", alias = "POWER")]
    Power,
    #[serde(rename = "GND", alias = "GROUND")]
    Ground,
    #[serde(rename = "INPUT")]
    Input,
    #[serde(rename = "OUTPUT")]
    Output,
    #[serde(rename = "CLOCK")]
    Clock,
    #[serde(rename = "NC", alias = "NOT_CONNECTED")]
    NotConnected,
    /// A signal carried for display only, never driven by the engine.
    #[serde(rename = "NAMED")]
    Named,
}

impl PinRole {
    pub fn is_active(&self) -> bool {
        *self != PinRole::NotConnected
    }

    /// Short tag used by the console pin diagram.
    pub fn tag(&self) -> &'static str {
        match self {
            PinRole::Power => "VCC",
            PinRole::Ground => "GND",
            PinRole::Input => "IN",
            PinRole::Output => "OUT",
            PinRole::Clock => "CLK",
            PinRole::NotConnected => "NC",
            PinRole::Named => "SIG",
        }
    }
}

/// One package pin, numbered as on the datasheet (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSpec {
    #[serde(rename = "pin")]
    pub position: u8,
    pub role: PinRole,
    #[serde(default)]
    pub active_low: bool,
    #[serde(default)]
    pub label: String,
}

impl PinSpec {
    pub fn new(position: u8, role: PinRole) -> Self {
        PinSpec {
            position,
            role,
            active_low: false,
            label: String::new(),
        }
    }
}

/// How a physical pin is set up before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Output,
    Input,
    InputPullup,
}

/// Raw access to the controller's pins, keyed by physical pin handle.
///
/// Supplied by the embedding application; the engine never touches hardware
/// itself. Writes to a pin that is not configured as an output are ignored.
pub trait PinDriver {
    fn configure(&mut self, pin: u8, mode: PinMode);
    fn write(&mut self, pin: u8, level: bool);
    fn read(&self, pin: u8) -> PinValue;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SimulatedPin {
    mode: PinMode,
    driven: bool,
    external: Option<bool>,
}

/// In-memory pin driver used by the front ends and the tests.
///
/// External levels (a pressed button, a test lead on an input) are injected with
/// [`SimulatedPinBank::set_external`]; every output write is recorded.
#[derive(Debug, Default, Clone)]
pub struct SimulatedPinBank {
    pins: BTreeMap<u8, SimulatedPin>,
    history: Vec<(u8, bool)>,
}

impl SimulatedPinBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.pins.get(&pin).map(|p| p.mode)
    }

    pub fn set_external(&mut self, pin: u8, level: bool) {
        let entry = self.pins.entry(pin).or_insert(SimulatedPin {
            mode: PinMode::Input,
            driven: false,
            external: None,
        });
        entry.external = Some(level);
    }

    pub fn release_external(&mut self, pin: u8) {
        if let Some(entry) = self.pins.get_mut(&pin) {
            entry.external = None;
        }
    }

    pub fn history(&self) -> &[(u8, bool)] {
        &self.history
    }

    pub fn take_history(&mut self) -> Vec<(u8, bool)> {
        std::mem::take(&mut self.history)
    }
}

impl PinDriver for SimulatedPinBank {
    fn configure(&mut self, pin: u8, mode: PinMode) {
        let entry = self.pins.entry(pin).or_insert(SimulatedPin {
            mode,
            driven: false,
            external: None,
        });
        entry.mode = mode;
        if mode != PinMode::Output {
            entry.driven = false;
        }
    }

    fn write(&mut self, pin: u8, level: bool) {
        match self.pins.get_mut(&pin) {
            Some(entry) if entry.mode == PinMode::Output => {
                entry.driven = level;
                self.history.push((pin, level));
            }
            _ => log::debug!("ignoring write to non-output pin {}", pin),
        }
    }

    fn read(&self, pin: u8) -> PinValue {
        match self.pins.get(&pin) {
            Some(p) => match p.mode {
                PinMode::Output => PinValue::from_bool(p.driven),
                PinMode::InputPullup => PinValue::from_bool(p.external.unwrap_or(true)),
                PinMode::Input => p.external.map(PinValue::from_bool).unwrap_or(PinValue::HighZ),
            },
            None => PinValue::HighZ,
        }
    }
}
