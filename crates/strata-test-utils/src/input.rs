//! Shorthands for input events bound by `InputMap::with_ui_defaults`.

use strata_input::InputEvent;

pub fn press(code: &str) -> InputEvent {
    InputEvent::key_pressed(code)
}

pub fn release(code: &str) -> InputEvent {
    InputEvent::key_released(code)
}

pub fn accept(pressed: bool) -> InputEvent {
    InputEvent::key("Enter", pressed)
}

pub fn cancel(pressed: bool) -> InputEvent {
    InputEvent::key("Escape", pressed)
}

pub fn up(pressed: bool) -> InputEvent {
    InputEvent::key("ArrowUp", pressed)
}

pub fn down(pressed: bool) -> InputEvent {
    InputEvent::key("ArrowDown", pressed)
}

pub fn left(pressed: bool) -> InputEvent {
    InputEvent::key("ArrowLeft", pressed)
}

pub fn right(pressed: bool) -> InputEvent {
    InputEvent::key("ArrowRight", pressed)
}
