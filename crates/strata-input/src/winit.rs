//! Conversion from `winit` window events.

use ::winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use ::winit::keyboard::PhysicalKey;

use crate::event::{InputEvent, MouseButton};

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back => MouseButton::Back,
            WinitMouseButton::Forward => MouseButton::Forward,
            WinitMouseButton::Other(id) => MouseButton::Other(id),
        }
    }
}

impl InputEvent {
    /// Converts key and mouse button events. Keys are named after their
    /// `KeyCode` variant, matching [`InputMap::with_ui_defaults`].
    ///
    /// [`InputMap::with_ui_defaults`]: crate::InputMap::with_ui_defaults
    pub fn from_winit(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let pressed = event.state == ElementState::Pressed;
                Some(InputEvent::key(format!("{code:?}"), pressed).with_echo(event.repeat))
            }
            WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::mouse_button(
                (*button).into(),
                *state == ElementState::Pressed,
            )),
            _ => None,
        }
    }
}

/// `Some(false)` when the window lost focus, `Some(true)` when it gained it.
pub fn focus_change(event: &WindowEvent) -> Option<bool> {
    match event {
        WindowEvent::Focused(focused) => Some(*focused),
        _ => None,
    }
}
