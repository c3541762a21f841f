//! # Text Command Protocol
//!
//! One command per line, verbs are case-sensitive and arguments follow a
//! colon:
//!
//! | Line          | Reply                                             |
//! |---------------|---------------------------------------------------|
//! | `IC:<name>`   | `OK:IC_SELECTED:...` or `ERR:IC_NOT_FOUND`         |
//! | `PINS:<bits>` | `OK:PINS_SET` or `ERR:<reason>`                    |
//! | `STATUS`      | `STATUS:IC=...` or `STATUS:NO_IC`                  |
//! | `LIST`        | `AVAILABLE_ICS:` followed by one line per IC       |
//! | `CLOCK:PULSE` | `CLOCK:PULSE_GENERATED`, nothing without a clock   |
//! | `SYNC`        | `SYNC:OK`                                          |
//!
//! Bit strings list the active (connected) pins of the selected IC in
//! ascending datasheet order, pin 1 first.

use crate::catalog::IcRegistry;
use crate::error::EngineError;
use crate::mapper::PinMap;
use crate::profile::IcProfile;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectIc(String),
    SetInputs(String),
    Status,
    List,
    ClockPulse,
    Sync,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, EngineError> {
        let line = line.trim();
        match line {
            "STATUS" => return Ok(Command::Status),
            "LIST" => return Ok(Command::List),
            "SYNC" => return Ok(Command::Sync),
            "CLOCK:PULSE" => return Ok(Command::ClockPulse),
            _ => {}
        }
        if let Some(name) = line.strip_prefix("IC:") {
            return Ok(Command::SelectIc(name.to_string()));
        }
        if let Some(bits) = line.strip_prefix("PINS:") {
            return Ok(Command::SetInputs(bits.to_string()));
        }
        Err(EngineError::InvalidCommand(line.to_string()))
    }
}

pub fn error_line(error: &EngineError) -> String {
    format!("ERR:{}", error.code())
}

fn summary(profile: &IcProfile, map: &PinMap) -> String {
    let mut text = format!(
        "{},PINS={},GATES={},INPUTS={}",
        profile.name,
        map.active_pin_count(),
        profile.gate_count(),
        map.mapped_inputs()
    );
    if let Some(clock) = map.clock_pin {
        text.push_str(&format!(",CLOCK={}", clock));
    }
    text
}

pub fn selected_line(profile: &IcProfile, map: &PinMap) -> String {
    format!("OK:IC_SELECTED:{}", summary(profile, map))
}

pub fn status_line(session: &Session) -> String {
    match session.profile() {
        Some(profile) => format!("STATUS:IC={}", summary(profile, session.pin_map())),
        None => "STATUS:NO_IC".to_string(),
    }
}

pub fn list_lines(registry: &IcRegistry) -> Vec<String> {
    let mut lines = vec!["AVAILABLE_ICS:".to_string()];
    for entry in registry.list() {
        lines.push(format!(
            "{} ({} pins, {} gates)",
            entry.name, entry.pin_count, entry.gate_count
        ));
    }
    lines
}

pub fn pins_line(bits: &str) -> String {
    format!("PINS:{}", bits)
}

pub const PINS_SET: &str = "OK:PINS_SET";
pub const SYNC_OK: &str = "SYNC:OK";
