//! # Emulator Configuration
//!
//! JSON configuration for the board wiring and the engine timings. Every
//! field has a default, so an empty object `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "board": {
//!     "ic_pins": [22, 24, 26, 28, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41],
//!     "button_pins": [2, 3, 4, 5, 6, 7, 8, 9]
//!   },
//!   "debounce_ms": 50,
//!   "clock_settle_ms": 5,
//!   "status_interval_ms": 1000,
//!   "catalog_path": "my_chips.json",
//!   "listen_addr": "127.0.0.1:7400",
//!   "console": { "refresh_rate_ms": 100 }
//! }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const BUTTON_COUNT: usize = 8;

/// Which controller pin sits behind each datasheet position and button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardLayout {
    /// `ic_pins[n]` is the physical handle wired to datasheet pin `n + 1`.
    pub ic_pins: Vec<u8>,
    pub button_pins: [u8; BUTTON_COUNT],
}

impl BoardLayout {
    pub fn physical(&self, position: u8) -> Option<u8> {
        if position == 0 {
            return None;
        }
        self.ic_pins.get(position as usize - 1).copied()
    }

    pub fn capacity(&self) -> usize {
        self.ic_pins.len()
    }
}

impl Default for BoardLayout {
    // Arduino Mega socket wiring, extended to 16 pins.
    fn default() -> Self {
        Self {
            ic_pins: vec![22, 24, 26, 28, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41],
            button_pins: [2, 3, 4, 5, 6, 7, 8, 9],
        }
    }
}

/// Console configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub refresh_rate_ms: u64,
    /// How long a simulated button stays pressed after its key is hit.
    pub button_hold_ms: u64,
    pub max_log_lines: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 100,
            button_hold_ms: 80,
            max_log_lines: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub board: BoardLayout,
    pub debounce_ms: u64,
    pub clock_settle_ms: u64,
    pub status_interval_ms: u64,
    pub catalog_path: Option<String>,
    pub listen_addr: String,
    pub console: ConsoleConfig,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            board: BoardLayout::default(),
            debounce_ms: 50,
            clock_settle_ms: 5,
            status_interval_ms: 1000,
            catalog_path: None,
            listen_addr: "127.0.0.1:7400".to_string(),
            console: ConsoleConfig::default(),
        }
    }
}

impl EmulatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn clock_settle(&self) -> Duration {
        Duration::from_millis(self.clock_settle_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
}
