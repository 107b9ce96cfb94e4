//! Composite gesture tests driven through the router.

use std::cell::RefCell;
use std::rc::Rc;

use strata_core::alloc::Pool;
use strata_core::math::Vec2;
use strata_core::protected::ExceptionPublisher;
use strata_input::{
    CachedInputEvent, CompositeState, InputEvent, InputMap, InputPhase, InputRouter, actions,
};

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Start(Vec2),
    Update(Vec2),
    End(Vec2),
}

struct Harness {
    map: InputMap,
    pool: Pool,
    publisher: ExceptionPublisher,
    router: InputRouter<Vec<Gesture>>,
    log: Vec<Gesture>,
}

impl Harness {
    fn new() -> Self {
        Self {
            map: InputMap::with_ui_defaults(),
            pool: Pool::new(),
            publisher: ExceptionPublisher::new(),
            router: InputRouter::new(),
            log: Vec::new(),
        }
    }

    fn register_vector(&mut self) {
        use actions::*;
        for state in [CompositeState::Start, CompositeState::Update, CompositeState::End] {
            self.router.register_vector(
                UI_UP,
                UI_DOWN,
                UI_LEFT,
                UI_RIGHT,
                state,
                move |log: &mut Vec<Gesture>, v| {
                    log.push(match state {
                        CompositeState::Start => Gesture::Start(v),
                        CompositeState::Update => Gesture::Update(v),
                        CompositeState::End => Gesture::End(v),
                    })
                },
                &mut self.pool,
            );
        }
    }

    fn send(&mut self, event: InputEvent) -> bool {
        let mut cached = CachedInputEvent::new(&event, &self.map, &mut self.pool);
        let handled = self.router.dispatch(
            &mut cached,
            &mut self.log,
            &self.publisher,
            "harness",
            &mut self.pool,
        );
        cached.release(&mut self.pool);
        handled
    }
}

#[test]
fn test_vector_gesture_sequence() {
    let mut h = Harness::new();
    h.register_vector();

    for event in [
        InputEvent::key_pressed("ArrowUp"),
        InputEvent::key_pressed("ArrowRight"),
        InputEvent::key_released("ArrowUp"),
        InputEvent::key_pressed("ArrowDown"),
        InputEvent::key_released("ArrowRight"),
        InputEvent::key_pressed("ArrowLeft"),
        InputEvent::key_released("ArrowDown"),
        InputEvent::key_released("ArrowLeft"),
    ] {
        assert!(h.send(event));
    }

    assert_eq!(
        h.log,
        vec![
            Gesture::Start(Vec2::new(0.0, 1.0)),
            Gesture::Update(Vec2::new(0.0, 1.0)),
            Gesture::Update(Vec2::new(1.0, 1.0)),
            Gesture::Update(Vec2::new(1.0, 0.0)),
            Gesture::Update(Vec2::new(1.0, -1.0)),
            Gesture::Update(Vec2::new(0.0, -1.0)),
            Gesture::Update(Vec2::new(-1.0, -1.0)),
            Gesture::Update(Vec2::new(-1.0, 0.0)),
            Gesture::Update(Vec2::new(0.0, 0.0)),
            Gesture::End(Vec2::new(0.0, 0.0)),
        ]
    );
}

#[test]
fn test_vector_analog_stick() {
    let mut h = Harness::new();
    h.register_vector();

    h.send(InputEvent::joy_axis(0, 0, 0.6));
    h.send(InputEvent::joy_axis(0, 0, 0.9));
    h.send(InputEvent::joy_axis(0, 0, 0.1));

    assert_eq!(h.log.first(), Some(&Gesture::Start(Vec2::new(0.6, 0.0))));
    assert!(h.log.contains(&Gesture::Update(Vec2::new(0.9, 0.0))));
    assert_eq!(h.log.last(), Some(&Gesture::End(Vec2::ZERO)));
}

#[test]
fn test_cancel_pressed_ends_gesture() {
    let mut h = Harness::new();
    h.register_vector();

    h.send(InputEvent::key_pressed("ArrowLeft"));
    h.send(InputEvent::key_pressed("ArrowUp"));
    h.router.cancel_pressed(&mut h.log, &h.publisher, "harness");

    let ends = h.log.iter().filter(|g| matches!(g, Gesture::End(_))).count();
    assert_eq!(ends, 1);
    assert_eq!(h.log.last(), Some(&Gesture::End(Vec2::ZERO)));
}

#[test]
fn test_axis_shares_tracker_with_plain_inputs() {
    let mut h = Harness::new();
    let pressed = Rc::new(RefCell::new(0));
    let counter = pressed.clone();
    h.router.register_input(
        actions::UI_RIGHT,
        InputPhase::Pressed,
        move |_, _| *counter.borrow_mut() += 1,
        &mut h.pool,
    );
    let axis = h.router.register_axis(
        actions::UI_LEFT,
        actions::UI_RIGHT,
        CompositeState::Update,
        |log: &mut Vec<Gesture>, v| log.push(Gesture::Update(Vec2::new(v, 0.0))),
        &mut h.pool,
    );

    h.send(InputEvent::key_pressed("ArrowRight"));
    assert_eq!(*pressed.borrow(), 1);
    assert_eq!(h.log, vec![Gesture::Update(Vec2::new(1.0, 0.0))]);

    // Removing the axis keeps the plain binding on the shared action alive.
    assert!(h.router.remove_axis(axis, &mut h.pool));
    assert_eq!(
        h.router.registered_actions().collect::<Vec<_>>(),
        vec![actions::UI_RIGHT]
    );
    h.send(InputEvent::key_pressed("ArrowRight"));
    assert_eq!(*pressed.borrow(), 2);
}

#[test]
fn test_stick_flick_releases_opposite_side() {
    let mut h = Harness::new();
    h.register_vector();

    assert!(h.send(InputEvent::joy_axis(0, 0, -0.9)));
    assert!(h.send(InputEvent::joy_axis(0, 0, 0.9)));

    assert_eq!(
        h.log,
        vec![
            Gesture::Start(Vec2::new(-0.9, 0.0)),
            Gesture::Update(Vec2::new(-0.9, 0.0)),
            Gesture::Update(Vec2::new(0.0, 0.0)),
            Gesture::Update(Vec2::new(0.9, 0.0)),
        ]
    );
    assert!(!h.router.is_pressed(actions::UI_LEFT));
    assert!(h.router.is_pressed(actions::UI_RIGHT));
}

#[test]
fn test_stick_motion_skips_released_actions() {
    let mut h = Harness::new();
    let releases = Rc::new(RefCell::new(0));
    let counter = releases.clone();
    h.router.register_input(
        actions::UI_LEFT,
        InputPhase::Released,
        move |_, event| {
            assert!(!event.is_pressed());
            *counter.borrow_mut() += 1;
        },
        &mut h.pool,
    );

    assert!(!h.send(InputEvent::joy_axis(0, 0, 0.9)));
    assert_eq!(*releases.borrow(), 0);
}
