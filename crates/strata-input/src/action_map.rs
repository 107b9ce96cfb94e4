//! Named actions and the physical inputs bound to them.

use indexmap::IndexMap;

use crate::event::{AxisDirection, InputEvent, InputKind, InputPhase, MouseButton};

/// Built-in UI action names bound by [`InputMap::with_ui_defaults`].
pub mod actions {
    pub const UI_ACCEPT: &str = "ui_accept";
    pub const UI_CANCEL: &str = "ui_cancel";
    pub const UI_LEFT: &str = "ui_left";
    pub const UI_RIGHT: &str = "ui_right";
    pub const UI_UP: &str = "ui_up";
    pub const UI_DOWN: &str = "ui_down";
    pub const UI_FOCUS_NEXT: &str = "ui_focus_next";
    pub const UI_FOCUS_PREV: &str = "ui_focus_prev";
}

/// A physical input that triggers an action.
#[derive(Debug, Clone, PartialEq)]
pub enum InputBinding {
    Key(String),
    MouseButton(MouseButton),
    /// `device: None` matches every device.
    JoyButton { device: Option<u32>, button: u32 },
    JoyAxis {
        device: Option<u32>,
        axis: u32,
        direction: AxisDirection,
    },
}

impl InputBinding {
    pub fn key(code: impl Into<String>) -> Self {
        InputBinding::Key(code.into())
    }

    pub fn joy_button(button: u32) -> Self {
        InputBinding::JoyButton {
            device: None,
            button,
        }
    }

    pub fn joy_axis(axis: u32, direction: AxisDirection) -> Self {
        InputBinding::JoyAxis {
            device: None,
            axis,
            direction,
        }
    }

    /// Whether `event` comes from this physical input.
    ///
    /// An axis binding matches every event on its axis, whichever way the
    /// stick points.
    pub fn matches(&self, event: &InputEvent) -> bool {
        self.phase_of(event).is_some()
    }

    /// The phase `event` has for this binding, or `None` if it comes from
    /// another input.
    ///
    /// Axis events are pressed only for the binding of the direction the
    /// stick points in. The opposite direction sees a release, so a flick
    /// across the dead zone still releases the side that was held.
    pub fn phase_of(&self, event: &InputEvent) -> Option<InputPhase> {
        let matched = match (self, event.kind()) {
            (InputBinding::Key(bound), InputKind::Key { code }) => bound == code,
            (InputBinding::MouseButton(bound), InputKind::MouseButton(button)) => bound == button,
            (
                InputBinding::JoyButton { device, button },
                InputKind::JoyButton {
                    device: event_device,
                    button: event_button,
                },
            ) => device_matches(*device, *event_device) && button == event_button,
            (
                InputBinding::JoyAxis {
                    device,
                    axis,
                    direction,
                },
                InputKind::JoyAxis {
                    device: event_device,
                    axis: event_axis,
                    value,
                },
            ) => {
                if !device_matches(*device, *event_device) || axis != event_axis {
                    return None;
                }
                let pressed = event.is_pressed() && AxisDirection::of(*value) == *direction;
                return Some(if pressed {
                    InputPhase::Pressed
                } else {
                    InputPhase::Released
                });
            }
            _ => false,
        };
        matched.then_some(event.phase())
    }
}

fn device_matches(bound: Option<u32>, device: u32) -> bool {
    bound.is_none_or(|bound| bound == device)
}

/// Answers whether an event belongs to a named action, and in which phase.
pub trait ActionMatcher {
    /// `None` when `event` is not bound to `action`.
    fn action_phase(&self, action: &str, event: &InputEvent) -> Option<InputPhase>;

    fn action_has_event(&self, action: &str, event: &InputEvent) -> bool {
        self.action_phase(action, event).is_some()
    }
}

/// Action name to bindings table.
#[derive(Debug, Clone, Default)]
pub struct InputMap {
    actions: IndexMap<String, Vec<InputBinding>>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyboard and gamepad bindings for the built-in UI actions.
    pub fn with_ui_defaults() -> Self {
        use actions::*;

        let mut map = Self::new();
        map.bind(UI_ACCEPT, InputBinding::key("Enter"));
        map.bind(UI_ACCEPT, InputBinding::key("NumpadEnter"));
        map.bind(UI_ACCEPT, InputBinding::key("Space"));
        map.bind(UI_ACCEPT, InputBinding::joy_button(0));
        map.bind(UI_CANCEL, InputBinding::key("Escape"));
        map.bind(UI_CANCEL, InputBinding::joy_button(1));
        map.bind(UI_LEFT, InputBinding::key("ArrowLeft"));
        map.bind(UI_LEFT, InputBinding::joy_button(13));
        map.bind(UI_LEFT, InputBinding::joy_axis(0, AxisDirection::Negative));
        map.bind(UI_RIGHT, InputBinding::key("ArrowRight"));
        map.bind(UI_RIGHT, InputBinding::joy_button(14));
        map.bind(UI_RIGHT, InputBinding::joy_axis(0, AxisDirection::Positive));
        map.bind(UI_UP, InputBinding::key("ArrowUp"));
        map.bind(UI_UP, InputBinding::joy_button(11));
        map.bind(UI_UP, InputBinding::joy_axis(1, AxisDirection::Negative));
        map.bind(UI_DOWN, InputBinding::key("ArrowDown"));
        map.bind(UI_DOWN, InputBinding::joy_button(12));
        map.bind(UI_DOWN, InputBinding::joy_axis(1, AxisDirection::Positive));
        map.bind(UI_FOCUS_NEXT, InputBinding::key("Tab"));
        map.add_action(UI_FOCUS_PREV);
        map
    }

    /// Declares an action with no bindings. Existing bindings are kept.
    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.entry(action.into()).or_default();
    }

    pub fn bind(&mut self, action: impl Into<String>, binding: InputBinding) {
        let bindings = self.actions.entry(action.into()).or_default();
        if !bindings.contains(&binding) {
            bindings.push(binding);
        }
    }

    /// Removes one binding. Returns whether it was present.
    pub fn unbind(&mut self, action: &str, binding: &InputBinding) -> bool {
        let Some(bindings) = self.actions.get_mut(action) else {
            return false;
        };
        let before = bindings.len();
        bindings.retain(|b| b != binding);
        bindings.len() != before
    }

    pub fn erase_action(&mut self, action: &str) -> bool {
        self.actions.shift_remove(action).is_some()
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub fn bindings(&self, action: &str) -> &[InputBinding] {
        self.actions.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl ActionMatcher for InputMap {
    /// Pressed if any binding of `action` sees a press.
    fn action_phase(&self, action: &str, event: &InputEvent) -> Option<InputPhase> {
        if let InputKind::Action { name } = event.kind() {
            return (name == action).then_some(event.phase());
        }
        self.bindings(action)
            .iter()
            .filter_map(|binding| binding.phase_of(event))
            .reduce(|phase, other| {
                if other == InputPhase::Pressed {
                    other
                } else {
                    phase
                }
            })
    }
}
