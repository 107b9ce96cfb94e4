//! Raw input events as seen by the router.

use std::fmt;

/// Joypad axis values at or beyond this magnitude count as pressed.
pub const JOY_AXIS_PRESS_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Which half of a joypad axis a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Negative,
    Positive,
}

impl AxisDirection {
    pub fn of(value: f32) -> Self {
        if value < 0.0 {
            AxisDirection::Negative
        } else {
            AxisDirection::Positive
        }
    }
}

/// The physical source of an [`InputEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    /// Keyboard key, named after its physical code (e.g. `"Escape"`, `"KeyA"`).
    Key { code: String },
    MouseButton(MouseButton),
    JoyButton { device: u32, button: u32 },
    /// Analog axis; `value` is in `-1.0..=1.0`.
    JoyAxis { device: u32, axis: u32, value: f32 },
    /// Synthetic named action, used for releases generated by the runtime.
    Action { name: String },
}

/// Phase of an input event, or the chain a callback is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPhase {
    Pressed,
    Released,
    /// Registration only: fires for both pressed and released events.
    Any,
}

impl InputPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputPhase::Pressed => "pressed",
            InputPhase::Released => "released",
            InputPhase::Any => "any",
        }
    }
}

impl fmt::Display for InputPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    kind: InputKind,
    pressed: bool,
    strength: f32,
    echo: bool,
}

impl InputEvent {
    pub fn key(code: impl Into<String>, pressed: bool) -> Self {
        Self::digital(InputKind::Key { code: code.into() }, pressed)
    }

    pub fn key_pressed(code: impl Into<String>) -> Self {
        Self::key(code, true)
    }

    pub fn key_released(code: impl Into<String>) -> Self {
        Self::key(code, false)
    }

    pub fn mouse_button(button: MouseButton, pressed: bool) -> Self {
        Self::digital(InputKind::MouseButton(button), pressed)
    }

    pub fn joy_button(device: u32, button: u32, pressed: bool) -> Self {
        Self::digital(InputKind::JoyButton { device, button }, pressed)
    }

    pub fn joy_axis(device: u32, axis: u32, value: f32) -> Self {
        let value = value.clamp(-1.0, 1.0);
        let strength = value.abs();
        Self {
            kind: InputKind::JoyAxis {
                device,
                axis,
                value,
            },
            pressed: strength >= JOY_AXIS_PRESS_THRESHOLD,
            strength,
            echo: false,
        }
    }

    pub fn action(name: impl Into<String>, pressed: bool) -> Self {
        Self::digital(InputKind::Action { name: name.into() }, pressed)
    }

    fn digital(kind: InputKind, pressed: bool) -> Self {
        Self {
            kind,
            pressed,
            strength: if pressed { 1.0 } else { 0.0 },
            echo: false,
        }
    }

    /// The same input seen as a release, e.g. by the opposite direction of
    /// an axis.
    pub fn released(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            pressed: false,
            strength: 0.0,
            echo: self.echo,
        }
    }

    /// Marks a key-repeat event.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_echo(&self) -> bool {
        self.echo
    }

    /// Either [`InputPhase::Pressed`] or [`InputPhase::Released`].
    pub fn phase(&self) -> InputPhase {
        if self.pressed {
            InputPhase::Pressed
        } else {
            InputPhase::Released
        }
    }

    /// Press magnitude: 1.0 or 0.0 for digital sources, `|value|` for axes.
    pub fn strength(&self) -> f32 {
        self.strength
    }
}

bitflags::bitflags! {
    /// Outcome of offering an event to a handler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HandleStatus: u8 {
        const HANDLED = 0b00000001;
        const CONSUMED = 0b00000010;
    }
}

impl HandleStatus {
    pub const fn is_consumed(&self) -> bool {
        self.contains(Self::CONSUMED)
    }

    pub const fn is_handled(&self) -> bool {
        self.contains(Self::HANDLED)
    }

    pub const fn consumed() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits() | Self::CONSUMED.bits())
    }

    pub const fn handled() -> Self {
        Self::from_bits_truncate(Self::HANDLED.bits())
    }

    pub const fn ignored() -> Self {
        Self::empty()
    }

    /// `consumed()` if `handled`, otherwise `ignored()`.
    pub const fn from_consumed(handled: bool) -> Self {
        if handled { Self::consumed() } else { Self::ignored() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joy_axis_threshold() {
        let weak = InputEvent::joy_axis(0, 0, -0.3);
        assert!(!weak.is_pressed());
        assert_eq!(weak.phase(), InputPhase::Released);

        let strong = InputEvent::joy_axis(0, 0, -0.8);
        assert!(strong.is_pressed());
        assert!((strong.strength() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_digital_strength() {
        assert_eq!(InputEvent::key_pressed("Escape").strength(), 1.0);
        assert_eq!(InputEvent::key_released("Escape").strength(), 0.0);
    }

    #[test]
    fn test_handle_status() {
        assert!(HandleStatus::consumed().is_consumed());
        assert!(HandleStatus::consumed().is_handled());
        assert!(!HandleStatus::handled().is_consumed());
        assert_eq!(HandleStatus::from_consumed(false), HandleStatus::ignored());
    }
}
