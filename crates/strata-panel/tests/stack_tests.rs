//! Stack discipline, focus restoration and containers.

use std::rc::Rc;

use strata_panel::{
    ChildId, ContainerId, CreatePolicy, HeadlessView, OpenOptions, OwnerId, PanelError,
    PanelHandle, PanelRuntime, PanelStatus, PanelView,
};
use strata_test_utils::{HookLog, ManualTweener, RecordingPanel};

type Screen = RecordingPanel<(), ()>;

fn open_screen(runtime: &mut PanelRuntime, label: &str, log: &HookLog) -> PanelHandle<Screen> {
    open_screen_with(runtime, label, log, OpenOptions::new())
}

fn open_screen_with(
    runtime: &mut PanelRuntime,
    label: &str,
    log: &HookLog,
    options: OpenOptions,
) -> PanelHandle<Screen> {
    let template = Screen::template(label, log);
    let handle = runtime
        .create_panel::<Screen>(&template, CreatePolicy::ForceNew, |_| {})
        .unwrap();
    runtime.open_panel(handle, (), options).unwrap();
    handle
}

#[test]
fn test_stack_is_lifo() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let a = open_screen(&mut runtime, "a", &log);
    let b = open_screen(&mut runtime, "b", &log);
    let c = open_screen(&mut runtime, "c", &log);
    assert_eq!(runtime.stack(), [a.id(), b.id(), c.id()]);
    assert_eq!(runtime.top(), Some(c.id()));

    runtime.close_panel(c, ()).unwrap();
    runtime.close_panel(b, ()).unwrap();
    assert_eq!(runtime.stack(), [a.id()]);
}

#[test]
fn test_closing_below_top_fails_without_side_effects() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let a = open_screen(&mut runtime, "a", &log);
    let b = open_screen(&mut runtime, "b", &log);
    log.clear();

    assert_eq!(
        runtime.close_panel(a, ()),
        Err(PanelError::ClosingOrder {
            panel: a.id(),
            top: Some(b.id())
        })
    );
    assert_eq!(runtime.stack(), [a.id(), b.id()]);
    assert_eq!(runtime.status(a), Some(PanelStatus::Opened));
    assert!(log.is_empty());
    assert!(!runtime.close_requested(a).unwrap().is_fired());
}

#[test]
fn test_only_top_panel_is_interactive() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let a = open_screen(&mut runtime, "a", &log);
    let b = open_screen(&mut runtime, "b", &log);

    assert!(!runtime.view_as::<HeadlessView>(a).unwrap().is_interactive());
    assert!(runtime.view_as::<HeadlessView>(b).unwrap().is_interactive());
    // The default visual keeps the previous panel on screen.
    assert!(runtime.view(a).unwrap().is_visible());

    runtime.close_panel(b, ()).unwrap();
    assert!(runtime.view_as::<HeadlessView>(a).unwrap().is_interactive());
}

#[test]
fn test_focus_is_restored_after_child_closes() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let settings = open_screen(&mut runtime, "settings", &log);
    runtime
        .view_as_mut::<HeadlessView>(settings)
        .unwrap()
        .focus("second");

    let dialog = open_screen(&mut runtime, "dialog", &log);
    assert_eq!(runtime.view(settings).unwrap().focused_child(), None);

    runtime
        .view_as_mut::<HeadlessView>(dialog)
        .unwrap()
        .focus("first");
    runtime.close_panel(dialog, ()).unwrap();

    assert_eq!(
        runtime.view(settings).unwrap().focused_child(),
        Some(ChildId::new("second"))
    );
}

#[test]
fn test_hidden_previous_is_shown_again() {
    let log = HookLog::new();
    let tweener = Rc::new(ManualTweener::new());
    let mut runtime = PanelRuntime::new();
    runtime.set_default_tweener(Some(tweener.clone()));

    let a = open_screen(&mut runtime, "a", &log);
    let b = open_screen_with(&mut runtime, "b", &log, OpenOptions::new().hide_previous());
    assert!(!runtime.view(a).unwrap().is_visible());
    assert!(runtime.view(b).unwrap().is_visible());

    tweener.clear_calls();
    runtime.close_panel(b, ()).unwrap();
    assert!(runtime.view(a).unwrap().is_visible());
    assert_eq!(tweener.count_shows(), 1);
    assert_eq!(tweener.count_hides(), 1);
}

#[test]
fn test_visible_previous_is_not_reshown() {
    let log = HookLog::new();
    let tweener = Rc::new(ManualTweener::new());
    let mut runtime = PanelRuntime::new();
    runtime.set_default_tweener(Some(tweener.clone()));

    open_screen(&mut runtime, "a", &log);
    let b = open_screen(&mut runtime, "b", &log);
    tweener.clear_calls();

    runtime.close_panel(b, ()).unwrap();
    assert_eq!(tweener.count_shows(), 0);
}

#[test]
fn test_cancel_closes_top_only() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let a_template = Screen::template_with("a", &log, |panel| panel.closing_on_cancel(()));
    let b_template = Screen::template_with("b", &log, |panel| panel.closing_on_cancel(()));

    let a = runtime
        .create_panel::<Screen>(&a_template, CreatePolicy::ForceNew, |_| {})
        .unwrap();
    runtime.open_panel(a, (), OpenOptions::new()).unwrap();
    let b = runtime
        .create_panel::<Screen>(&b_template, CreatePolicy::ForceNew, |_| {})
        .unwrap();
    runtime.open_panel(b, (), OpenOptions::new()).unwrap();

    let escape = strata_test_utils::input::cancel(true);
    assert!(runtime.process_input(&escape).unwrap());
    assert_eq!(runtime.stack(), [a.id()]);
    assert!(runtime.process_input(&escape).unwrap());
    assert!(runtime.stack().is_empty());
    assert!(!runtime.process_input(&escape).unwrap());
}

#[test]
fn test_container_stack_parents_new_panels() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let overlay = runtime.create_container("overlay");
    let owner = OwnerId::new();

    runtime.push_container(owner, overlay).unwrap();
    assert_eq!(runtime.current_container(), overlay);
    let popup = open_screen(&mut runtime, "popup", &log);
    assert_eq!(runtime.tree().parent_of(popup.id()), Some(overlay));

    assert_eq!(runtime.pop_container(owner).unwrap(), overlay);
    assert_eq!(runtime.current_container(), ContainerId::ROOT);
    assert_eq!(runtime.tree().parent_of(popup.id()), Some(ContainerId::ROOT));
}

#[test]
fn test_pop_container_checks_owner() {
    let mut runtime = PanelRuntime::new();
    let overlay = runtime.create_container("overlay");
    let owner = OwnerId::new();
    let intruder = OwnerId::new();
    runtime.push_container(owner, overlay).unwrap();

    assert_eq!(
        runtime.pop_container(intruder),
        Err(PanelError::UnauthorizedOwner {
            requester: intruder,
            owner: Some(owner),
            container: overlay,
        })
    );
    assert_eq!(runtime.container_depth(), 1);
    assert!(runtime.pop_container(owner).is_ok());
    assert_eq!(runtime.container_depth(), 0);
}

#[test]
fn test_cached_panel_returns_to_root() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let overlay = runtime.create_container("overlay");
    let owner = OwnerId::new();
    runtime.push_container(owner, overlay).unwrap();

    let popup = open_screen(&mut runtime, "popup", &log);
    runtime.close_panel(popup, ()).unwrap();
    assert!(runtime.is_buffered(popup));
    assert_eq!(runtime.tree().parent_of(popup.id()), Some(ContainerId::ROOT));

    runtime.open_panel(popup, (), OpenOptions::new()).unwrap();
    assert_eq!(runtime.tree().parent_of(popup.id()), Some(overlay));
}

#[test]
fn test_deferred_open_from_hook_callback() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let menu = open_screen(&mut runtime, "menu", &log);
    let options_template = Screen::template("options", &log);

    runtime
        .with_panel(menu, move |_, cx| {
            let template = options_template.clone();
            cx.defer(move |runtime| {
                let options =
                    runtime.create_panel::<Screen>(&template, CreatePolicy::TryReuse, |_| {})?;
                runtime.open_panel(options, (), OpenOptions::new())
            });
        })
        .unwrap();

    assert_eq!(runtime.stack().len(), 2);
    assert_eq!(runtime.name(runtime.top().unwrap()), Some("options"));
}

#[test]
fn test_hidden_layer_scenario() {
    let log = HookLog::new();
    let mut runtime = PanelRuntime::new();
    let first = open_screen(&mut runtime, "first", &log);
    runtime
        .view_as_mut::<HeadlessView>(first)
        .unwrap()
        .focus("first");

    let second = open_screen_with(&mut runtime, "second", &log, OpenOptions::new().hide_previous());
    assert_eq!(runtime.stack(), [first.id(), second.id()]);
    let below = runtime.view_as::<HeadlessView>(first).unwrap();
    assert!(!below.is_visible());
    assert!(!below.is_interactive());

    runtime.close_panel(second, ()).unwrap();
    assert_eq!(runtime.stack(), [first.id()]);
    let view = runtime.view_as::<HeadlessView>(first).unwrap();
    assert!(view.is_visible());
    assert!(view.is_interactive());
    assert_eq!(view.focused_child(), Some(ChildId::new("first")));
}
