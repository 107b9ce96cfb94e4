//! Panel views: the bridge to whatever widget toolkit draws a panel.
//!
//! The runtime never touches widgets directly. It asks the view to change
//! visibility and opacity, to gate its interactive children, and to report
//! or move keyboard focus.

use std::any::Any;

use strata_core::alloc::HashMap;

use crate::id::ChildId;

/// Widget-toolkit adapter bound to one panel.
pub trait PanelView: Any {
    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Current opacity in `0.0..=1.0`. Views without opacity report 1.0.
    fn opacity(&self) -> f32 {
        1.0
    }

    fn set_opacity(&mut self, _opacity: f32) {}

    /// Enables or disables focus and pointer input on every interactive
    /// child, restoring their original settings when re-enabled.
    fn set_children_interactive(&mut self, enabled: bool);

    /// The focused child, if focus currently rests inside this panel.
    fn focused_child(&self) -> Option<ChildId>;

    /// Moves focus to `child`. Returns false if it cannot take focus.
    fn grab_focus(&mut self, child: ChildId) -> bool;
}

/// Focus policy determining how a widget can receive focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusPolicy {
    /// Widget can receive focus via Tab/Shift+Tab and mouse clicks
    Focusable,
    /// Widget can only receive focus via mouse clicks, not keyboard
    ClickFocusable,
    /// Widget cannot receive focus
    #[default]
    NotFocusable,
}

/// How a widget treats pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseFilter {
    /// Handle the event and stop propagation.
    #[default]
    Stop,
    /// Handle the event and let it propagate.
    Pass,
    /// Do not receive pointer events.
    Ignore,
}

/// Interactive settings of one child widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractiveChild {
    pub id: ChildId,
    pub focus: FocusPolicy,
    pub mouse: MouseFilter,
}

impl InteractiveChild {
    pub fn new(id: impl Into<ChildId>, focus: FocusPolicy) -> Self {
        Self {
            id: id.into(),
            focus,
            mouse: MouseFilter::Stop,
        }
    }

    /// Pointer-only child: clickable, never takes keyboard focus.
    pub fn mouse_only(id: impl Into<ChildId>) -> Self {
        Self::new(id, FocusPolicy::NotFocusable)
    }

    pub fn is_interactive(&self) -> bool {
        self.focus != FocusPolicy::NotFocusable || self.mouse != MouseFilter::Ignore
    }
}

/// Disables a set of children and remembers how to restore them.
///
/// Children that were already non-interactive are left alone and are not
/// touched on restore either. Disabling twice keeps the first snapshot.
#[derive(Debug, Default)]
pub struct ChildGate {
    cached: HashMap<ChildId, (FocusPolicy, MouseFilter)>,
    disabled: bool,
}

impl ChildGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set(&mut self, children: &mut [InteractiveChild], enabled: bool) {
        if enabled {
            self.enable(children);
        } else {
            self.disable(children);
        }
    }

    pub fn disable(&mut self, children: &mut [InteractiveChild]) {
        if self.disabled {
            return;
        }
        self.disabled = true;
        self.cached.clear();
        for child in children.iter_mut().filter(|c| c.is_interactive()) {
            self.cached.insert(child.id, (child.focus, child.mouse));
            child.focus = FocusPolicy::NotFocusable;
            child.mouse = MouseFilter::Ignore;
        }
    }

    pub fn enable(&mut self, children: &mut [InteractiveChild]) {
        if !self.disabled {
            return;
        }
        self.disabled = false;
        for child in children.iter_mut() {
            if let Some((focus, mouse)) = self.cached.remove(&child.id) {
                child.focus = focus;
                child.mouse = mouse;
            }
        }
        self.cached.clear();
    }
}

/// A toolkit-free [`PanelView`] holding visibility, opacity, a flat list of
/// interactive children and a focus slot.
#[derive(Debug)]
pub struct HeadlessView {
    visible: bool,
    opacity: f32,
    children: Vec<InteractiveChild>,
    focused: Option<ChildId>,
    gate: ChildGate,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    pub fn new() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            children: Vec::new(),
            focused: None,
            gate: ChildGate::new(),
        }
    }

    pub fn with_child(mut self, id: impl Into<ChildId>, focus: FocusPolicy) -> Self {
        self.children.push(InteractiveChild::new(id, focus));
        self
    }

    pub fn with_mouse_only_child(mut self, id: impl Into<ChildId>) -> Self {
        self.children.push(InteractiveChild::mouse_only(id));
        self
    }

    pub fn push_child(&mut self, child: InteractiveChild) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[InteractiveChild] {
        &self.children
    }

    pub fn child(&self, id: impl Into<ChildId>) -> Option<&InteractiveChild> {
        let id = id.into();
        self.children.iter().find(|c| c.id == id)
    }

    pub fn is_interactive(&self) -> bool {
        !self.gate.is_disabled()
    }

    /// Host-driven focus change, e.g. the user tabbed to `id`.
    pub fn focus(&mut self, id: impl Into<ChildId>) -> bool {
        self.grab_focus(id.into())
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }
}

impl PanelView for HeadlessView {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn set_children_interactive(&mut self, enabled: bool) {
        self.gate.set(&mut self.children, enabled);
        if !enabled {
            self.focused = None;
        }
    }

    fn focused_child(&self) -> Option<ChildId> {
        self.focused
    }

    fn grab_focus(&mut self, child: ChildId) -> bool {
        let focusable = self
            .children
            .iter()
            .any(|c| c.id == child && c.focus != FocusPolicy::NotFocusable);
        if focusable {
            self.focused = Some(child);
        }
        focusable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> HeadlessView {
        HeadlessView::new()
            .with_child("play", FocusPolicy::Focusable)
            .with_child("options", FocusPolicy::ClickFocusable)
            .with_child("label", FocusPolicy::NotFocusable)
            .with_mouse_only_child("backdrop")
    }

    #[test]
    fn test_gate_round_trip() {
        let mut view = menu();
        let before = view.children().to_vec();

        view.set_children_interactive(false);
        assert!(view.children().iter().all(|c| !c.is_interactive()));

        view.set_children_interactive(true);
        assert_eq!(view.children(), before.as_slice());
    }

    #[test]
    fn test_double_disable_keeps_snapshot() {
        let mut view = menu();
        let before = view.children().to_vec();
        view.set_children_interactive(false);
        view.set_children_interactive(false);
        view.set_children_interactive(true);
        assert_eq!(view.children(), before.as_slice());
    }

    #[test]
    fn test_disabled_children_refuse_focus() {
        let mut view = menu();
        assert!(view.focus("play"));
        view.set_children_interactive(false);
        assert_eq!(view.focused_child(), None);
        assert!(!view.focus("play"));
        view.set_children_interactive(true);
        assert!(view.focus("play"));
    }

    #[test]
    fn test_mouse_only_child_never_focuses() {
        let mut view = menu();
        assert!(!view.focus("backdrop"));
        assert!(view.child("backdrop").is_some_and(InteractiveChild::is_interactive));
    }
}
