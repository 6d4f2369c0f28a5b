//! Momentary button state: a binary state that goes `on` for a short
//! moment when a rocker switch is pressed.
//!
//! The first observation after subscribing is the observable replaying its
//! current value, not a press, so it is swallowed.

use std::fmt;

/// Which half of a rocker was pressed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonSide {
    #[default]
    None,
    Top,
    Bottom,
}

impl ButtonSide {
    #[must_use]
    pub fn from_is_top(is_top: bool) -> Self {
        if is_top { Self::Top } else { Self::Bottom }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for ButtonSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `idle → active → idle` state of a momentary binary sensor.
#[derive(Debug, Clone, Default)]
pub struct MomentaryState {
    active: bool,
    ignored_initial: bool,
    last_button_pressed: ButtonSide,
}

impl MomentaryState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one state-change notification.
    ///
    /// Returns `true` when the notification counted as a press (and the
    /// state is now active), `false` for the swallowed initial replay.
    pub fn observe(&mut self, is_top: bool) -> bool {
        if !self.ignored_initial {
            self.ignored_initial = true;
            return false;
        }
        self.active = true;
        self.last_button_pressed = ButtonSide::from_is_top(is_top);
        true
    }

    /// Return to idle. The last pressed side is kept.
    pub fn reset(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn last_button_pressed(&self) -> ButtonSide {
        self.last_button_pressed
    }
}
