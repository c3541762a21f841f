//! Property-based tests for the command path
//!
//! Random bit strings and random lines are thrown at the dispatcher to check
//! the invariants that must hold for every catalog entry.

use crate::mocks::*;
use proptest::prelude::*;
use rusty_ic::catalog::IcRegistry;
use rusty_ic::pin::PinRole;

fn catalog_names() -> Vec<String> {
    IcRegistry::builtin()
        .unwrap()
        .list()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

mod proptest_helpers {
    use super::*;

    pub fn arb_ic() -> impl Strategy<Value = String> {
        proptest::sample::select(catalog_names())
    }

    pub fn arb_bits(max_len: usize) -> impl Strategy<Value = Vec<bool>> {
        proptest::collection::vec(any::<bool>(), max_len)
    }
}

proptest! {
    #[test]
    fn test_valid_bits_reach_inputs_and_outputs_follow(
        name in proptest_helpers::arb_ic(),
        raw in proptest_helpers::arb_bits(16),
    ) {
        let mut rig = Rig::new();
        rig.serial_command(&format!("IC:{}", name));
        let profile = rig.dispatcher.session().profile().cloned().unwrap();
        let positions = rig.dispatcher.session().pin_map().active_positions.clone();

        let bits: String = raw
            .iter()
            .take(positions.len())
            .map(|b| if *b { '1' } else { '0' })
            .collect();
        let replies = rig.serial_command(&format!("PINS:{}", bits));
        prop_assert_eq!(&replies[0], "OK:PINS_SET");

        let session = rig.dispatcher.session();
        prop_assert_eq!(session.active_bits().len(), positions.len());
        for (position, bit) in positions.iter().zip(bits.chars()) {
            if profile.role(*position) == Some(PinRole::Input) {
                prop_assert_eq!(session.pin_values().get(*position), bit == '1');
            }
        }
        for gate in &profile.gates {
            let inputs: Vec<bool> = gate
                .inputs
                .iter()
                .map(|p| session.pin_values().get(*p))
                .collect();
            prop_assert_eq!(session.pin_values().get(gate.output), gate.kind.apply(&inputs));
        }
    }

    #[test]
    fn test_rejected_bits_do_not_mutate(
        name in proptest_helpers::arb_ic(),
        junk in "[0-9a-z]{0,20}",
    ) {
        let mut rig = Rig::new();
        rig.serial_command(&format!("IC:{}", name));
        let active = rig.dispatcher.session().pin_map().active_pin_count();
        let valid = junk.len() == active && junk.chars().all(|c| c == '0' || c == '1');
        prop_assume!(!valid);

        let before = rig.dispatcher.session().active_bits();
        rig.clear_outputs();
        let replies = rig.serial_command(&format!("PINS:{}", junk));
        prop_assert_eq!(replies.len(), 1);
        prop_assert!(replies[0] == "ERR:INVALID_LENGTH" || replies[0] == "ERR:INVALID_BINARY");
        prop_assert_eq!(rig.dispatcher.session().active_bits(), before);
        prop_assert!(rig.wireless.sent().is_empty());
    }

    #[test]
    fn test_arbitrary_lines_get_a_known_reply(line in "[ -~]{0,24}") {
        let mut rig = Rig::new();
        for reply in rig.serial_command(&line) {
            prop_assert!(
                ["OK:", "ERR:", "STATUS:", "AVAILABLE_ICS:", "PINS:", "SYNC:OK"]
                    .iter()
                    .any(|prefix| reply.starts_with(prefix))
                    || reply.contains(" pins, "),
                "unexpected reply {:?} to {:?}",
                reply,
                line
            );
        }
    }

    #[test]
    fn test_active_count_matches_connected_pins(name in proptest_helpers::arb_ic()) {
        let mut rig = Rig::new();
        let reply = rig.serial_command(&format!("IC:{}", name));
        let profile = rig.dispatcher.session().profile().cloned().unwrap();
        let connected = profile.pins.iter().filter(|p| p.role != PinRole::NotConnected).count();
        let expected = format!(",PINS={},", connected);
        prop_assert!(reply[0].contains(&expected));
        prop_assert_eq!(rig.dispatcher.session().active_bits().len(), connected);
    }
}
