//! The single mutable record of the emulator: which IC is selected and the
//! current level of each of its pins.

use crate::config::BUTTON_COUNT;
use crate::mapper::PinMap;
use crate::pin::PinRole;
use crate::profile::IcProfile;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Logic level per datasheet position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinLevels {
    levels: BTreeMap<u8, bool>,
}

impl PinLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown positions read as low.
    pub fn get(&self, position: u8) -> bool {
        self.levels.get(&position).copied().unwrap_or(false)
    }

    pub fn set(&mut self, position: u8, level: bool) {
        self.levels.insert(position, level);
    }

    pub fn toggle(&mut self, position: u8) -> bool {
        let level = !self.get(position);
        self.set(position, level);
        level
    }

    /// `'0'`/`'1'` string over `positions`, in the order given.
    pub fn bits(&self, positions: &[u8]) -> String {
        positions
            .iter()
            .map(|p| if self.get(*p) { '1' } else { '0' })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        self.levels.iter().map(|(p, v)| (*p, *v))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub(crate) profile: Option<Arc<IcProfile>>,
    pub(crate) pin_map: PinMap,
    pub(crate) pin_values: PinLevels,
    pub(crate) last_button_states: [bool; BUTTON_COUNT],
    pub(crate) last_debounce_time: Option<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&Arc<IcProfile>> {
        self.profile.as_ref()
    }

    pub fn pin_map(&self) -> &PinMap {
        &self.pin_map
    }

    pub fn pin_values(&self) -> &PinLevels {
        &self.pin_values
    }

    pub fn clock_pin(&self) -> Option<u8> {
        self.pin_map.clock_pin
    }

    /// Current bit string over the active positions, pin 1 first.
    pub fn active_bits(&self) -> String {
        self.pin_values.bits(&self.pin_map.active_positions)
    }

    /// Replace the selected IC. Pin levels start from scratch with only the
    /// supply pins high; button and debounce tracking follow the physical
    /// buttons and are kept.
    pub(crate) fn reset(&mut self, profile: Arc<IcProfile>, pin_map: PinMap) {
        let mut levels = PinLevels::new();
        for pin in profile.pins.iter().filter(|p| p.role == PinRole::Power) {
            levels.set(pin.position, true);
        }
        self.profile = Some(profile);
        self.pin_map = pin_map;
        self.pin_values = levels;
    }
}
