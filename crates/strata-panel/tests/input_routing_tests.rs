//! Input delivered through the runtime.

use std::cell::RefCell;
use std::rc::Rc;

use strata_input::{CompositeState, InputBatch, InputEvent, InputPhase, actions};
use strata_panel::{CreatePolicy, OpenOptions, PanelHandle, PanelRuntime};
use strata_test_utils::{HookLog, RecordingPanel, input};

type Screen = RecordingPanel<(), ()>;
type Events = Rc<RefCell<Vec<String>>>;

fn open(runtime: &mut PanelRuntime, label: &str, log: &HookLog) -> PanelHandle<Screen> {
    let template = Screen::template(label, log);
    let handle = runtime
        .create_panel::<Screen>(&template, CreatePolicy::ForceNew, |_| {})
        .unwrap();
    runtime.open_panel(handle, (), OpenOptions::new()).unwrap();
    handle
}

fn record_accept(runtime: &mut PanelRuntime, panel: PanelHandle<Screen>, events: &Events) {
    let events = Rc::clone(events);
    runtime
        .with_panel(panel, move |screen, cx| {
            let label = screen.label.clone();
            cx.register_input(actions::UI_ACCEPT, InputPhase::Any, move |_, event| {
                let phase = if event.is_pressed() { "down" } else { "up" };
                events.borrow_mut().push(format!("{label}:{phase}"));
            });
        })
        .unwrap();
}

#[test]
fn test_input_reaches_top_panel_only() {
    let log = HookLog::new();
    let events = Events::default();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);
    record_accept(&mut runtime, a, &events);
    let b = open(&mut runtime, "b", &log);
    record_accept(&mut runtime, b, &events);

    assert!(runtime.process_input(&input::accept(true)).unwrap());
    assert!(runtime.process_input(&input::accept(false)).unwrap());
    assert_eq!(*events.borrow(), ["b:down", "b:up"]);
}

#[test]
fn test_unmapped_input_is_not_handled() {
    let log = HookLog::new();
    let events = Events::default();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);
    record_accept(&mut runtime, a, &events);

    assert!(!runtime.process_input(&InputEvent::key_pressed("KeyQ")).unwrap());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_opening_panel_releases_held_actions_below() {
    let log = HookLog::new();
    let events = Events::default();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);
    record_accept(&mut runtime, a, &events);

    runtime.process_input(&input::accept(true)).unwrap();
    open(&mut runtime, "b", &log);
    assert_eq!(*events.borrow(), ["a:down", "a:up"]);
    assert_eq!(runtime.input(a).unwrap().pressed_actions().count(), 0);
}

#[test]
fn test_focus_loss_releases_held_actions() {
    let log = HookLog::new();
    let events = Events::default();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);
    record_accept(&mut runtime, a, &events);

    runtime.process_input(&input::accept(true)).unwrap();
    assert!(runtime.input(a).unwrap().is_pressed(actions::UI_ACCEPT));
    runtime.notify_focus_lost().unwrap();
    assert_eq!(*events.borrow(), ["a:down", "a:up"]);

    runtime.notify_focus_lost().unwrap();
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn test_axis_reports_through_runtime() {
    let log = HookLog::new();
    let values = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = PanelRuntime::new();
    let slider = open(&mut runtime, "slider", &log);

    let sink = Rc::clone(&values);
    runtime
        .with_panel(slider, move |_, cx| {
            cx.register_axis(
                actions::UI_LEFT,
                actions::UI_RIGHT,
                CompositeState::Update,
                move |_, value| sink.borrow_mut().push(value),
            );
        })
        .unwrap();

    runtime.process_input(&input::right(true)).unwrap();
    runtime.process_input(&input::left(true)).unwrap();
    runtime.process_input(&input::right(false)).unwrap();
    assert_eq!(*values.borrow(), [1.0, 0.0, -1.0]);
}

#[test]
fn test_batch_keeps_unhandled_events() {
    let log = HookLog::new();
    let events = Events::default();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);
    record_accept(&mut runtime, a, &events);

    let mut batch: InputBatch = [
        input::accept(true),
        InputEvent::key_pressed("KeyQ"),
        input::accept(false),
    ]
    .into_iter()
    .collect();
    runtime.handle_events(&mut batch).unwrap();

    assert_eq!(batch.len(), 1);
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn test_cancel_action_can_be_remapped() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    runtime.input_map_mut().add_action("menu_back");
    runtime
        .input_map_mut()
        .bind("menu_back", strata_input::InputBinding::key("Backspace"));
    runtime.set_cancel_action("menu_back");

    let template = Screen::template_with("a", &log, |panel| panel.closing_on_cancel(()));
    let a = runtime
        .create_panel::<Screen>(&template, CreatePolicy::ForceNew, |_| {})
        .unwrap();
    runtime.open_panel(a, (), OpenOptions::new()).unwrap();

    assert!(!runtime.process_input(&input::cancel(true)).unwrap());
    assert!(runtime.process_input(&input::press("Backspace")).unwrap());
    assert!(runtime.stack().is_empty());
}

#[test]
fn test_close_with_cancel_toggle() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let a = open(&mut runtime, "a", &log);

    runtime
        .with_panel(a, |_, cx| cx.enable_close_with_cancel(InputPhase::Pressed))
        .unwrap();
    runtime
        .with_panel(a, |_, cx| assert!(cx.disable_close_with_cancel()))
        .unwrap();
    assert!(!runtime.process_input(&input::cancel(true)).unwrap());
    assert_eq!(runtime.stack(), [a.id()]);

    runtime
        .with_panel(a, |_, cx| cx.enable_close_with_cancel(InputPhase::Pressed))
        .unwrap();
    assert!(runtime.process_input(&input::cancel(true)).unwrap());
    assert!(runtime.stack().is_empty());
}

#[test]
fn test_focus_loss_ends_gestures() {
    let log = HookLog::new();
    let ends = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = PanelRuntime::new();
    let pad = open(&mut runtime, "pad", &log);

    let sink = Rc::clone(&ends);
    runtime
        .with_panel(pad, move |_, cx| {
            cx.register_vector(
                actions::UI_UP,
                actions::UI_DOWN,
                actions::UI_LEFT,
                actions::UI_RIGHT,
                CompositeState::End,
                move |_, value| sink.borrow_mut().push(value),
            );
        })
        .unwrap();

    runtime.process_input(&input::up(true)).unwrap();
    runtime.process_input(&input::right(true)).unwrap();
    assert!(ends.borrow().is_empty());

    runtime.notify_focus_lost().unwrap();
    assert_eq!(ends.borrow().len(), 1);
    assert_eq!(ends.borrow()[0], strata_core::math::Vec2::ZERO);
}
