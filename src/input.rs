//! Input sources feeding the session's pin levels: remote bit strings and
//! debounced physical buttons.

use crate::config::{BoardLayout, BUTTON_COUNT};
use crate::error::EngineError;
use crate::evaluator::evaluate;
use crate::mapper::ButtonTarget;
use crate::pin::{PinDriver, PinRole, PinValue};
use crate::session::Session;
use log::debug;
use std::time::{Duration, Instant};

/// Apply a remote bit string to the selected IC's input pins.
///
/// The string covers the active positions in ascending order. Characters
/// landing on non-input pins are accepted and ignored. Nothing is written
/// unless the whole string is valid.
pub fn write_bits(session: &mut Session, bits: &str) -> Result<(), EngineError> {
    let profile = session.profile.clone().ok_or(EngineError::NoIcSelected)?;

    let expected = session.pin_map.active_pin_count();
    let actual = bits.chars().count();
    if actual != expected {
        return Err(EngineError::InvalidLength { expected, actual });
    }
    if let Some(bad) = bits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(EngineError::InvalidBinary(bad));
    }

    for (position, bit) in session.pin_map.active_positions.iter().zip(bits.chars()) {
        if profile.role(*position) == Some(PinRole::Input) {
            session.pin_values.set(*position, bit == '1');
        }
    }
    evaluate(&profile, &mut session.pin_values);
    Ok(())
}

/// Something a button press asked the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Toggled { button: usize, position: u8, level: bool },
    ClockRequested { button: usize, position: u8 },
}

impl ButtonEvent {
    /// Event line announced to the transports, buttons numbered from 1.
    pub fn describe(&self) -> Option<String> {
        match self {
            ButtonEvent::Toggled {
                button,
                position,
                level,
            } => Some(format!(
                "BTN:{}:PIN{}:{}",
                button + 1,
                position,
                if *level { "HIGH" } else { "LOW" }
            )),
            ButtonEvent::ClockRequested { .. } => None,
        }
    }
}

/// Read the buttons; they are wired active low against the pull-ups.
pub fn read_buttons(board: &BoardLayout, driver: &dyn PinDriver) -> [bool; BUTTON_COUNT] {
    let mut pressed = [false; BUTTON_COUNT];
    for (state, pin) in pressed.iter_mut().zip(board.button_pins.iter()) {
        *state = driver.read(*pin) == PinValue::Low;
    }
    pressed
}

/// Process one sample of the button bank.
///
/// A single debounce window is shared by all buttons: while it is open the
/// sample is dropped entirely, and any accepted change reopens it. Only
/// released→pressed transitions act, and only with an IC selected.
pub fn sample_buttons(
    session: &mut Session,
    pressed: [bool; BUTTON_COUNT],
    now: Instant,
    window: Duration,
) -> Vec<ButtonEvent> {
    if let Some(last) = session.last_debounce_time {
        if now.saturating_duration_since(last) < window {
            return Vec::new();
        }
    }

    let mut events = Vec::new();
    let mut any_changed = false;
    for (button, is_pressed) in pressed.iter().enumerate() {
        if *is_pressed == session.last_button_states[button] {
            continue;
        }
        session.last_button_states[button] = *is_pressed;
        any_changed = true;

        if !*is_pressed || session.profile.is_none() {
            continue;
        }
        match session.pin_map.button_target(button) {
            ButtonTarget::Toggle(position) => {
                let level = session.pin_values.toggle(position);
                events.push(ButtonEvent::Toggled {
                    button,
                    position,
                    level,
                });
            }
            ButtonTarget::Clock(position) => {
                events.push(ButtonEvent::ClockRequested { button, position });
            }
            ButtonTarget::Unbound => debug!("Button {} is not mapped", button + 1),
        }
    }

    if any_changed {
        session.last_debounce_time = Some(now);
    }
    let toggled = events
        .iter()
        .any(|e| matches!(e, ButtonEvent::Toggled { .. }));
    if toggled {
        if let Some(profile) = session.profile.clone() {
            evaluate(&profile, &mut session.pin_values);
        }
    }
    events
}
