//! # IC Profiles
//!
//! An [`IcProfile`] is the declarative description of one chip: the role of
//! every package pin and the wiring of its internal gates. Profiles are
//! immutable once loaded; the evaluator interprets them generically, so a new
//! chip only needs a new catalog entry.
//!
//! ```rust
//! use rusty_ic::gate::{GateKind, GateSpec};
//! use rusty_ic::pin::{PinRole, PinSpec};
//! use rusty_ic::profile::IcProfile;
//!
//! let profile = IcProfile {
//!     name: "BUF1".to_string(),
//!     description: String::new(),
//!     pins: vec![
//!         PinSpec::new(1, PinRole::Input),
//!         PinSpec::new(2, PinRole::Output),
//!         PinSpec::new(3, PinRole::Ground),
//!         PinSpec::new(4, PinRole::Power),
//!     ],
//!     gates: vec![GateSpec::new(GateKind::Buffer, &[1], 2)],
//! };
//! assert!(profile.validate().is_ok());
//! ```

use crate::error::ConfigError;
use crate::gate::GateSpec;
use crate::pin::{PinRole, PinSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub pins: Vec<PinSpec>,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
}

impl IcProfile {
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn pin(&self, position: u8) -> Option<&PinSpec> {
        self.pins.iter().find(|p| p.position == position)
    }

    pub fn role(&self, position: u8) -> Option<PinRole> {
        self.pin(position).map(|p| p.role)
    }

    /// Datasheet positions of every pin that is not marked not-connected.
    pub fn active_positions(&self) -> Vec<u8> {
        self.pins
            .iter()
            .filter(|p| p.role.is_active())
            .map(|p| p.position)
            .collect()
    }

    pub fn active_pin_count(&self) -> usize {
        self.pins.iter().filter(|p| p.role.is_active()).count()
    }

    /// Check the structural invariants of the profile.
    ///
    /// Returns the list of non-fatal findings, wiring that the single-pass
    /// evaluator would resolve in declaration order.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidProfile {
            profile: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("empty name".to_string()));
        }
        if self.pins.is_empty() {
            return Err(invalid("no pins".to_string()));
        }
        for (i, pin) in self.pins.iter().enumerate() {
            if pin.position as usize != i + 1 {
                return Err(invalid(format!(
                    "pin entry {} has position {}, pins must cover 1..{} in order",
                    i + 1,
                    pin.position,
                    self.pins.len()
                )));
            }
        }

        for (index, gate) in self.gates.iter().enumerate() {
            if !gate.kind.accepts_inputs(gate.inputs.len()) {
                return Err(invalid(format!(
                    "gate {} ({}) has {} inputs",
                    index + 1,
                    gate.kind,
                    gate.inputs.len()
                )));
            }
            match self.role(gate.output) {
                Some(PinRole::Output) => {}
                Some(role) => {
                    return Err(invalid(format!(
                        "gate {} drives pin {} which is {:?}, not an output",
                        index + 1,
                        gate.output,
                        role
                    )))
                }
                None => {
                    return Err(invalid(format!(
                        "gate {} drives unknown pin {}",
                        index + 1,
                        gate.output
                    )))
                }
            }
            for input in &gate.inputs {
                match self.role(*input) {
                    Some(PinRole::Input) => {}
                    Some(role) => {
                        return Err(invalid(format!(
                            "gate {} reads pin {} which is {:?}, not an input",
                            index + 1,
                            input,
                            role
                        )))
                    }
                    None => {
                        return Err(invalid(format!(
                            "gate {} reads unknown pin {}",
                            index + 1,
                            input
                        )))
                    }
                }
            }
        }

        // Role checks above already keep one gate's output off another
        // gate's inputs; what can still go wrong is two gates sharing an
        // output, where the later gate silently wins.
        let mut findings = Vec::new();
        for (i, first) in self.gates.iter().enumerate() {
            for (j, second) in self.gates.iter().enumerate().skip(i + 1) {
                if first.output == second.output {
                    findings.push(format!(
                        "gates {} and {} both drive pin {}",
                        i + 1,
                        j + 1,
                        first.output
                    ));
                }
            }
        }
        Ok(findings)
    }
}
