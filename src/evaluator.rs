//! Generic gate evaluation over an [`IcProfile`].

use crate::profile::IcProfile;
use crate::session::PinLevels;

/// Recompute every gate output from the current input levels.
///
/// Gates run once each, in declaration order, with no dependency ordering
/// between them. A profile with no gates leaves `levels` untouched.
pub fn evaluate(profile: &IcProfile, levels: &mut PinLevels) {
    let mut inputs = Vec::with_capacity(4);
    for gate in &profile.gates {
        inputs.clear();
        inputs.extend(gate.inputs.iter().map(|p| levels.get(*p)));
        levels.set(gate.output, gate.kind.apply(&inputs));
    }
}

/// Level of each gate's output pin, in gate order.
pub fn gate_outputs(profile: &IcProfile, levels: &PinLevels) -> Vec<bool> {
    profile.gates.iter().map(|g| levels.get(g.output)).collect()
}
