//! Button Chord Resolution
//!
//! Maps raw platform button ids plus modifier state onto the canonical
//! three-button model. Two-button platforms emulate the middle button by
//! holding the chord modifier while pressing the primary button.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::input::error::{InputError, Result};

/// Number of canonical buttons
pub const NUM_BUTTONS: usize = 3;

/// Raw id the platform sends for events without a button
pub const RAW_BUTTON_NONE: i32 = 0;
/// Raw id of the primary button
pub const RAW_BUTTON_PRIMARY: i32 = 1;
/// Raw id of the secondary button
pub const RAW_BUTTON_SECONDARY: i32 = 2;
/// Raw id of a native middle button
pub const RAW_BUTTON_MIDDLE: i32 = 3;

/// Raw action id for a button press
pub const ACTION_PRESSED: i32 = 501;
/// Raw action id for a button release
pub const ACTION_RELEASED: i32 = 502;

/// Canonical button state array, each entry 0 or 1
pub type ButtonStates = [u8; NUM_BUTTONS];

/// Canonical mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary (usually left) button
    Primary,
    /// Middle button, real or chord-emulated
    Middle,
    /// Secondary (usually right) button
    Secondary,
}

impl MouseButton {
    /// Index into [`ButtonStates`], also the `button` field of a record
    pub fn index(self) -> usize {
        match self {
            MouseButton::Primary => 0,
            MouseButton::Middle => 1,
            MouseButton::Secondary => 2,
        }
    }

    /// Look a button up by canonical index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Primary),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Secondary),
            _ => None,
        }
    }
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Button went down
    Press,
    /// Button went up
    Release,
}

impl ButtonAction {
    /// Convert from the platform action id
    pub fn from_raw(action: i32) -> Result<Self> {
        match action {
            ACTION_PRESSED => Ok(ButtonAction::Press),
            ACTION_RELEASED => Ok(ButtonAction::Release),
            other => Err(InputError::InvalidAction(other)),
        }
    }

    /// Platform action id
    pub fn to_raw(self) -> i32 {
        match self {
            ButtonAction::Press => ACTION_PRESSED,
            ButtonAction::Release => ACTION_RELEASED,
        }
    }

    /// Value stored in the state array and in records
    pub fn state(self) -> u8 {
        match self {
            ButtonAction::Press => 1,
            ButtonAction::Release => 0,
        }
    }
}

/// Resolved canonical button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTransition {
    /// Canonical button
    pub button: MouseButton,
    /// New state, 0 or 1
    pub state: u8,
}

/// Resolves raw button events, holding the chord latch between press and release
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonChordResolver {
    chord_active: bool,
}

impl ButtonChordResolver {
    /// Create a resolver with no chord in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last primary press was chorded
    pub fn chord_active(&self) -> bool {
        self.chord_active
    }

    /// Resolve one raw event against the current canonical button states.
    ///
    /// Returns `Ok(None)` when no record should be produced: raw button 0, or a
    /// middle transition the state array already reflects.
    pub fn resolve(
        &mut self,
        raw_button: i32,
        raw_action: i32,
        modifier_held: bool,
        buttons: &ButtonStates,
    ) -> Result<Option<ButtonTransition>> {
        let action = ButtonAction::from_raw(raw_action).map_err(|e| {
            warn!("Rejected button event: {}", e);
            e
        })?;
        let state = action.state();

        let button = match raw_button {
            RAW_BUTTON_NONE => return Ok(None),
            RAW_BUTTON_PRIMARY => {
                if action == ButtonAction::Press {
                    self.chord_active = modifier_held;
                }
                if self.chord_active {
                    if Self::middle_already(buttons, state) {
                        trace!("Suppressed duplicate chorded middle transition");
                        return Ok(None);
                    }
                    MouseButton::Middle
                } else {
                    MouseButton::Primary
                }
            }
            RAW_BUTTON_SECONDARY => MouseButton::Secondary,
            RAW_BUTTON_MIDDLE => {
                if Self::middle_already(buttons, state) {
                    trace!("Suppressed duplicate middle transition");
                    return Ok(None);
                }
                MouseButton::Middle
            }
            other => {
                warn!("Rejected button event: unknown raw button {}", other);
                return Err(InputError::InvalidButton(other));
            }
        };

        Ok(Some(ButtonTransition { button, state }))
    }

    /// Forget any chord in progress
    pub fn reset(&mut self) {
        self.chord_active = false;
    }

    fn middle_already(buttons: &ButtonStates, state: u8) -> bool {
        buttons[MouseButton::Middle.index()] == state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(buttons: &mut ButtonStates, transition: Option<ButtonTransition>) {
        if let Some(t) = transition {
            buttons[t.button.index()] = t.state;
        }
    }

    #[test]
    fn test_plain_primary() {
        let mut resolver = ButtonChordResolver::new();
        let buttons = [0u8; NUM_BUTTONS];

        let t = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_PRESSED, false, &buttons)
            .unwrap()
            .unwrap();
        assert_eq!(t.button, MouseButton::Primary);
        assert_eq!(t.state, 1);
        assert!(!resolver.chord_active());
    }

    #[test]
    fn test_secondary_maps_directly() {
        let mut resolver = ButtonChordResolver::new();
        let buttons = [0u8; NUM_BUTTONS];

        let t = resolver
            .resolve(RAW_BUTTON_SECONDARY, ACTION_RELEASED, true, &buttons)
            .unwrap()
            .unwrap();
        assert_eq!(t.button, MouseButton::Secondary);
        assert_eq!(t.state, 0);
    }

    #[test]
    fn test_button_none_is_ignored() {
        let mut resolver = ButtonChordResolver::new();
        let buttons = [0u8; NUM_BUTTONS];

        let t = resolver
            .resolve(RAW_BUTTON_NONE, ACTION_PRESSED, false, &buttons)
            .unwrap();
        assert!(t.is_none());
    }

    #[test]
    fn test_chord_latched_at_press() {
        let mut resolver = ButtonChordResolver::new();
        let mut buttons = [0u8; NUM_BUTTONS];

        // Modifier held on press
        let press = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_PRESSED, true, &buttons)
            .unwrap();
        assert_eq!(
            press,
            Some(ButtonTransition {
                button: MouseButton::Middle,
                state: 1
            })
        );
        apply(&mut buttons, press);

        // Modifier already released when the button comes up
        let release = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_RELEASED, false, &buttons)
            .unwrap();
        assert_eq!(
            release,
            Some(ButtonTransition {
                button: MouseButton::Middle,
                state: 0
            })
        );
    }

    #[test]
    fn test_modifier_pressed_after_primary_press() {
        let mut resolver = ButtonChordResolver::new();
        let mut buttons = [0u8; NUM_BUTTONS];

        let press = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_PRESSED, false, &buttons)
            .unwrap();
        apply(&mut buttons, press);

        let release = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_RELEASED, true, &buttons)
            .unwrap()
            .unwrap();
        assert_eq!(release.button, MouseButton::Primary);
        assert_eq!(release.state, 0);
    }

    #[test]
    fn test_duplicate_middle_suppressed() {
        let mut resolver = ButtonChordResolver::new();
        let mut buttons = [0u8; NUM_BUTTONS];

        let native = resolver
            .resolve(RAW_BUTTON_MIDDLE, ACTION_PRESSED, false, &buttons)
            .unwrap();
        assert_eq!(native.map(|t| t.button), Some(MouseButton::Middle));
        apply(&mut buttons, native);

        let chorded = resolver
            .resolve(RAW_BUTTON_PRIMARY, ACTION_PRESSED, true, &buttons)
            .unwrap();
        assert!(chorded.is_none());

        let native_again = resolver
            .resolve(RAW_BUTTON_MIDDLE, ACTION_PRESSED, false, &buttons)
            .unwrap();
        assert!(native_again.is_none());
    }

    #[test]
    fn test_invalid_button() {
        let mut resolver = ButtonChordResolver::new();
        let buttons = [0u8; NUM_BUTTONS];

        assert_eq!(
            resolver.resolve(4, ACTION_PRESSED, false, &buttons),
            Err(InputError::InvalidButton(4))
        );
    }

    #[test]
    fn test_invalid_action_checked_first() {
        let mut resolver = ButtonChordResolver::new();
        let buttons = [0u8; NUM_BUTTONS];

        assert_eq!(
            resolver.resolve(RAW_BUTTON_NONE, 500, false, &buttons),
            Err(InputError::InvalidAction(500))
        );
    }

    #[test]
    fn test_action_round_trip_ids() {
        assert_eq!(ButtonAction::from_raw(ACTION_PRESSED), Ok(ButtonAction::Press));
        assert_eq!(ButtonAction::Release.to_raw(), ACTION_RELEASED);
        assert_eq!(ButtonAction::Press.state(), 1);
    }

    #[test]
    fn test_button_index() {
        for index in 0..NUM_BUTTONS {
            assert_eq!(MouseButton::from_index(index).unwrap().index(), index);
        }
        assert_eq!(MouseButton::from_index(3), None);
    }
}
