//! Translation between datasheet pin positions and controller pins.

use crate::config::{BoardLayout, BUTTON_COUNT};
use crate::error::EngineError;
use crate::pin::{PinDriver, PinMode, PinRole};
use crate::profile::IcProfile;
use crate::session::PinLevels;
use log::debug;

/// Button reserved for the clock pin when the profile has one.
pub const CLOCK_BUTTON: usize = BUTTON_COUNT - 1;

/// Role-derived lookup tables for the selected profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinMap {
    /// Positions whose role is not NOT_CONNECTED, ascending.
    pub active_positions: Vec<u8>,
    /// `input_pin_index[button]` is the INPUT position that button toggles.
    pub input_pin_index: Vec<u8>,
    pub clock_pin: Option<u8>,
}

/// What a physical button does for the selected profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTarget {
    Toggle(u8),
    Clock(u8),
    Unbound,
}

impl PinMap {
    pub fn for_profile(profile: &IcProfile) -> Self {
        let active_positions = profile.active_positions();
        let input_pin_index = profile
            .pins
            .iter()
            .filter(|p| p.role == PinRole::Input)
            .map(|p| p.position)
            .take(BUTTON_COUNT)
            .collect();
        let clock_pin = profile
            .pins
            .iter()
            .find(|p| p.role == PinRole::Clock)
            .map(|p| p.position);

        PinMap {
            active_positions,
            input_pin_index,
            clock_pin,
        }
    }

    pub fn active_pin_count(&self) -> usize {
        self.active_positions.len()
    }

    /// Number of buttons that toggle an input pin.
    pub fn mapped_inputs(&self) -> usize {
        match self.clock_pin {
            Some(_) => self.input_pin_index.len().min(CLOCK_BUTTON),
            None => self.input_pin_index.len(),
        }
    }

    pub fn button_target(&self, button: usize) -> ButtonTarget {
        if button == CLOCK_BUTTON {
            if let Some(clock) = self.clock_pin {
                return ButtonTarget::Clock(clock);
            }
        }
        match self.input_pin_index.get(button) {
            Some(position) => ButtonTarget::Toggle(*position),
            None => ButtonTarget::Unbound,
        }
    }
}

/// Make sure the board can host the profile at all.
pub fn check_fits(profile: &IcProfile, board: &BoardLayout) -> Result<(), EngineError> {
    if profile.pin_count() > board.capacity() {
        return Err(EngineError::BoardTooSmall {
            needed: profile.pin_count(),
            available: board.capacity(),
        });
    }
    Ok(())
}

/// Configure every package pin for its role.
///
/// Supply pins are driven to their rail, inputs, outputs and clocks start
/// low, and unconnected or display-only pins are left floating. Positions
/// beyond the package are released as well so that a 14-pin chip does not
/// inherit the rails of a previously selected 16-pin one.
pub fn configure_pins(profile: &IcProfile, board: &BoardLayout, driver: &mut dyn PinDriver) {
    for (index, physical) in board.ic_pins.iter().enumerate() {
        let role = u8::try_from(index + 1)
            .ok()
            .and_then(|position| profile.role(position));
        match role {
            Some(PinRole::Power) => {
                driver.configure(*physical, PinMode::Output);
                driver.write(*physical, true);
            }
            Some(PinRole::Ground | PinRole::Input | PinRole::Output | PinRole::Clock) => {
                driver.configure(*physical, PinMode::Output);
                driver.write(*physical, false);
            }
            Some(PinRole::NotConnected | PinRole::Named) | None => {
                driver.configure(*physical, PinMode::Input);
            }
        }
    }
    debug!("Configured {} pins for {}", profile.pin_count(), profile.name);
}

pub fn configure_buttons(board: &BoardLayout, driver: &mut dyn PinDriver) {
    for pin in board.button_pins {
        driver.configure(pin, PinMode::InputPullup);
    }
}

/// Push the engine-owned levels (inputs and gate outputs) to the pins.
pub fn write_levels(
    profile: &IcProfile,
    board: &BoardLayout,
    levels: &PinLevels,
    driver: &mut dyn PinDriver,
) {
    for pin in &profile.pins {
        if matches!(pin.role, PinRole::Input | PinRole::Output) {
            if let Some(physical) = board.physical(pin.position) {
                driver.write(physical, levels.get(pin.position));
            }
        }
    }
}
