//! # Rusty IC
//!
//! Emulates discrete logic ICs (74xx family and similar) from declarative
//! chip profiles.
//!
//! This library provides:
//! - A JSON catalog of IC profiles: pin roles plus a gate table
//! - Combinational gate evaluation over the selected package's pins
//! - Debounced push-button input and single-shot clock pulses
//! - A line-based text protocol shared by every control surface
//! - A terminal console, a stdio front end and a TCP server
//!
//! Hardware is reached only through the [`pin::PinDriver`],
//! [`transport::Transport`] and [`transport::StatusSink`] traits.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod input;
pub mod mapper;
pub mod pin;
pub mod profile;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

// Re-export commonly used items for easier importing
pub use catalog::IcRegistry;
pub use config::EmulatorConfig;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, EngineError};
pub use gate::{GateKind, GateSpec};
pub use pin::{PinDriver, PinRole, PinSpec, PinValue, SimulatedPinBank};
pub use profile::IcProfile;
pub use session::Session;
