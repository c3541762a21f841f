use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean function implemented by one gate inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Not,
    Buffer,
}

impl GateKind {
    pub fn is_unary(&self) -> bool {
        matches!(self, GateKind::Not | GateKind::Buffer)
    }

    /// Whether a gate of this kind may have `count` inputs.
    pub fn accepts_inputs(&self, count: usize) -> bool {
        if self.is_unary() {
            count == 1
        } else {
            (2..=4).contains(&count)
        }
    }

    /// Evaluate the gate function. Unary kinds look at the first input only.
    pub fn apply(&self, inputs: &[bool]) -> bool {
        let parity = || inputs.iter().filter(|v| **v).count() % 2 == 1;
        match self {
            GateKind::And => inputs.iter().all(|v| *v),
            GateKind::Or => inputs.iter().any(|v| *v),
            GateKind::Nand => !inputs.iter().all(|v| *v),
            GateKind::Nor => !inputs.iter().any(|v| *v),
            GateKind::Xor => parity(),
            GateKind::Xnor => !parity(),
            GateKind::Not => !inputs.first().copied().unwrap_or(false),
            GateKind::Buffer => inputs.first().copied().unwrap_or(false),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
            GateKind::Xnor => "XNOR",
            GateKind::Not => "NOT",
            GateKind::Buffer => "BUF",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One gate: which datasheet pins feed it and which pin it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    pub kind: GateKind,
    pub inputs: Vec<u8>,
    pub output: u8,
}

impl GateSpec {
    pub fn new(kind: GateKind, inputs: &[u8], output: u8) -> Self {
        GateSpec {
            kind,
            inputs: inputs.to_vec(),
            output,
        }
    }
}

impl fmt::Display for GateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<String> = self.inputs.iter().map(|p| p.to_string()).collect();
        write!(f, "{}({}) -> {}", self.kind, inputs.join(","), self.output)
    }
}
