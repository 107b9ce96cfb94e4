//! The [`Panel`] trait, its hook context and the type-erased panel box.
//!
//! A panel is split in three parts:
//! - the user type implementing [`Panel`], which carries hooks and game state
//! - a [`PanelView`] bound to the widget that draws it
//! - runtime-owned state (status, signals, input bindings, focus cache)
//!
//! Hooks receive a [`PanelCx`] giving access to the view, the input router
//! and a command buffer. Commands such as closing the panel are applied by
//! the runtime after the hook returns.

use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::rc::Rc;

use strata_core::alloc::Pool;
use strata_core::math::Vec2;
use strata_core::protected::{ExceptionPublisher, HookResult};
use strata_input::{BindingId, CompositeState, InputEvent, InputPhase};

use crate::awaitable::CloseNotifier;
use crate::error::PanelResult;
use crate::id::{PanelHandle, PanelId};
use crate::runtime::PanelRuntime;
use crate::signal::PanelSignal;
use crate::state::{PanelState, PanelStatus};
use crate::tween::PanelTweener;
use crate::view::PanelView;

/// A UI panel managed by a [`PanelRuntime`].
///
/// Hook failures (errors or panics) are reported through the runtime's
/// exception channel and do not abort the surrounding operation.
pub trait Panel: Sized + 'static {
    /// Value passed when the panel opens. Use `()` for none.
    type OpenArg: 'static;
    /// Value produced when the panel closes. Use `()` for none.
    type CloseArg: 'static;

    /// Runs once, right after the panel is instantiated.
    fn on_initialize(&mut self, _cx: &mut PanelCx<'_, Self>) -> HookResult {
        Ok(())
    }

    fn on_open(&mut self, cx: &mut PanelCx<'_, Self>, arg: &Self::OpenArg) -> HookResult;

    fn on_close(&mut self, _cx: &mut PanelCx<'_, Self>, _arg: &Self::CloseArg) -> HookResult {
        Ok(())
    }

    /// Runs right before the panel is destroyed.
    fn on_predelete(&mut self, _cx: &mut PanelCx<'_, Self>) -> HookResult {
        Ok(())
    }
}

/// Work scheduled against the runtime.
pub type Deferred = Box<dyn FnOnce(&mut PanelRuntime) -> PanelResult<()>>;

/// Requests collected while a hook or input callback runs.
///
/// The runtime applies them once the current operation has finished its own
/// sequence: a close requested from `on_open` happens after the panel is
/// fully open.
pub struct PanelCommands {
    panel: PanelId,
    close: Option<Box<dyn Any>>,
    deferred: Vec<Deferred>,
}

impl PanelCommands {
    pub(crate) fn new(panel: PanelId) -> Self {
        Self {
            panel,
            close: None,
            deferred: Vec::new(),
        }
    }

    /// The panel these commands belong to.
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    /// Requests that the owning panel closes with `arg`.
    ///
    /// Only the first request per batch is kept. An argument of the wrong
    /// type is reported as an error when the request is applied.
    pub fn close<A: 'static>(&mut self, arg: A) {
        if self.close.is_some() {
            tracing::warn!(panel = %self.panel, "close already requested; ignoring");
            return;
        }
        self.close = Some(Box::new(arg));
    }

    pub fn is_close_requested(&self) -> bool {
        self.close.is_some()
    }

    /// Schedules `f` to run against the runtime, e.g. to open another panel.
    pub fn defer(&mut self, f: impl FnOnce(&mut PanelRuntime) -> PanelResult<()> + 'static) {
        self.deferred.push(Box::new(f));
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_none() && self.deferred.is_empty()
    }

    pub(crate) fn take(&mut self) -> (Option<Box<dyn Any>>, Vec<Deferred>) {
        (self.close.take(), std::mem::take(&mut self.deferred))
    }
}

/// Borrowed runtime resources handed to a hook.
pub(crate) struct HookScope<'a> {
    pub id: PanelId,
    pub state: &'a mut PanelState,
    pub view: &'a mut (dyn PanelView + 'static),
    pub commands: &'a mut PanelCommands,
    pub pool: &'a mut Pool,
    pub cancel_action: &'a str,
    pub publisher: &'a ExceptionPublisher,
}

/// Context passed to [`Panel`] hooks.
pub struct PanelCx<'a, P: Panel> {
    id: PanelId,
    state: &'a mut PanelState,
    view: &'a mut (dyn PanelView + 'static),
    commands: &'a mut PanelCommands,
    pool: &'a mut Pool,
    cancel_action: &'a str,
    open_arg: Option<&'a P::OpenArg>,
    _marker: PhantomData<fn(&P)>,
}

impl<'a, P: Panel> PanelCx<'a, P> {
    pub(crate) fn new(scope: HookScope<'a>, open_arg: Option<&'a P::OpenArg>) -> Self {
        Self {
            id: scope.id,
            state: scope.state,
            view: scope.view,
            commands: scope.commands,
            pool: scope.pool,
            cancel_action: scope.cancel_action,
            open_arg,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn handle(&self) -> PanelHandle<P> {
        PanelHandle::new(self.id)
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn status(&self) -> PanelStatus {
        self.state.status
    }

    /// The argument of the current open, while the panel is opened.
    pub fn open_arg(&self) -> Option<&P::OpenArg> {
        self.open_arg
    }

    pub fn view(&self) -> &dyn PanelView {
        &*self.view
    }

    pub fn view_mut(&mut self) -> &mut (dyn PanelView + 'static) {
        &mut *self.view
    }

    /// Downcasts the view to its concrete type.
    pub fn view_as<V: PanelView>(&mut self) -> Option<&mut V> {
        let view: &mut dyn Any = &mut *self.view;
        view.downcast_mut::<V>()
    }

    pub fn commands(&mut self) -> &mut PanelCommands {
        &mut *self.commands
    }

    /// Requests that this panel closes with `arg` once the hook returns.
    pub fn close(&mut self, arg: P::CloseArg) {
        self.commands.close(arg);
    }

    pub fn defer(&mut self, f: impl FnOnce(&mut PanelRuntime) -> PanelResult<()> + 'static) {
        self.commands.defer(f);
    }

    /// Overrides the runtime's default tweener for this panel.
    pub fn set_tweener(&mut self, tweener: Option<Rc<dyn PanelTweener>>) {
        self.state.tweener = tweener;
    }

    pub fn close_requested(&self) -> PanelSignal {
        self.state.close_requested.signal()
    }

    pub fn open_transition_finished(&self) -> PanelSignal {
        self.state.open_transition.signal()
    }

    pub fn close_transition_finished(&self) -> PanelSignal {
        self.state.close_transition.signal()
    }

    pub fn register_input(
        &mut self,
        action: impl Into<String>,
        phase: InputPhase,
        callback: impl FnMut(&mut PanelCommands, &InputEvent) + 'static,
    ) -> BindingId {
        self.state
            .input
            .register_input(action, phase, callback, self.pool)
    }

    pub fn remove_input(&mut self, id: BindingId) -> bool {
        self.state.input.remove_input(id, self.pool)
    }

    /// Registers `callback` on the runtime's cancel action.
    pub fn register_cancel(
        &mut self,
        phase: InputPhase,
        callback: impl FnMut(&mut PanelCommands) + 'static,
    ) -> BindingId {
        self.state
            .input
            .register_cancel(self.cancel_action, phase, callback, self.pool)
    }

    pub fn register_axis(
        &mut self,
        negative: impl Into<String>,
        positive: impl Into<String>,
        state: CompositeState,
        callback: impl FnMut(&mut PanelCommands, f32) + 'static,
    ) -> BindingId {
        self.state
            .input
            .register_axis(negative, positive, state, callback, self.pool)
    }

    pub fn remove_axis(&mut self, id: BindingId) -> bool {
        self.state.input.remove_axis(id, self.pool)
    }

    pub fn register_vector(
        &mut self,
        up: impl Into<String>,
        down: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        state: CompositeState,
        callback: impl FnMut(&mut PanelCommands, Vec2) + 'static,
    ) -> BindingId {
        self.state
            .input
            .register_vector(up, down, left, right, state, callback, self.pool)
    }

    pub fn remove_vector(&mut self, id: BindingId) -> bool {
        self.state.input.remove_vector(id, self.pool)
    }

    /// Closes the panel with `CloseArg::default()` when the cancel action
    /// fires. Calling it again while enabled does nothing.
    pub fn enable_close_with_cancel(&mut self, phase: InputPhase)
    where
        P::CloseArg: Default,
    {
        if self.state.cancel_binding.is_some() {
            return;
        }
        let id = self.register_cancel(phase, |commands| {
            commands.close(P::CloseArg::default());
        });
        self.state.cancel_binding = Some(id);
    }

    pub fn disable_close_with_cancel(&mut self) -> bool {
        match self.state.cancel_binding.take() {
            Some(id) => self.state.input.remove_input(id, self.pool),
            None => false,
        }
    }
}

/// How a closing panel reports its close argument.
pub(crate) enum OnClose<T> {
    Callback(Box<dyn FnOnce(&mut PanelRuntime, T)>),
    Future(CloseNotifier<T>),
}

/// Work to run after the close sequence, with the runtime available again.
pub(crate) type Continuation = Box<dyn FnOnce(&mut PanelRuntime)>;

/// Operations the runtime performs without knowing the panel type.
pub(crate) trait ErasedPanel: Any {
    fn type_name(&self) -> &'static str;

    fn accepts_close_arg(&self, arg: &dyn Any) -> bool;

    fn close_arg_type_name(&self) -> &'static str;

    /// Runs the close hook and hands back the close callback, if any.
    fn close(&mut self, scope: HookScope<'_>, arg: Box<dyn Any>) -> Option<Continuation>;

    fn predelete(&mut self, scope: HookScope<'_>);
}

pub(crate) struct PanelBox<P: Panel> {
    pub panel: P,
    pub open_arg: Option<P::OpenArg>,
    pub on_close: Option<OnClose<P::CloseArg>>,
}

impl<P: Panel> PanelBox<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            open_arg: None,
            on_close: None,
        }
    }

    pub fn initialize(&mut self, scope: HookScope<'_>) {
        let publisher = scope.publisher;
        let mut cx = PanelCx::<P>::new(scope, None);
        let target = cx.state.name.clone();
        let panel = &mut self.panel;
        publisher.run("Panel Initialize", &target, "on_initialize", || {
            panel.on_initialize(&mut cx)
        });
    }

    pub fn open(
        &mut self,
        scope: HookScope<'_>,
        arg: P::OpenArg,
        on_close: Option<OnClose<P::CloseArg>>,
    ) {
        self.on_close = on_close;
        let publisher = scope.publisher;
        let arg = &*self.open_arg.insert(arg);
        let mut cx = PanelCx::<P>::new(scope, Some(arg));
        let target = cx.state.name.clone();
        let panel = &mut self.panel;
        publisher.run("Panel Open", &target, "on_open", || panel.on_open(&mut cx, arg));
    }
}

impl<P: Panel> ErasedPanel for PanelBox<P> {
    fn type_name(&self) -> &'static str {
        type_name::<P>()
    }

    fn accepts_close_arg(&self, arg: &dyn Any) -> bool {
        arg.is::<P::CloseArg>()
    }

    fn close_arg_type_name(&self) -> &'static str {
        type_name::<P::CloseArg>()
    }

    fn close(&mut self, scope: HookScope<'_>, arg: Box<dyn Any>) -> Option<Continuation> {
        let Ok(arg) = arg.downcast::<P::CloseArg>() else {
            tracing::error!(
                panel = %scope.id,
                expected = type_name::<P::CloseArg>(),
                "close argument type mismatch"
            );
            return None;
        };
        let arg = *arg;
        let publisher = scope.publisher;
        {
            let mut cx = PanelCx::<P>::new(scope, self.open_arg.as_ref());
            let target = cx.state.name.clone();
            let panel = &mut self.panel;
            publisher.run("Panel Close", &target, "on_close", || panel.on_close(&mut cx, &arg));
        }
        self.open_arg = None;

        match self.on_close.take() {
            Some(OnClose::Callback(callback)) => {
                Some(Box::new(move |runtime: &mut PanelRuntime| callback(runtime, arg)))
            }
            Some(OnClose::Future(notifier)) => {
                Some(Box::new(move |_: &mut PanelRuntime| notifier.complete(arg)))
            }
            None => None,
        }
    }

    fn predelete(&mut self, scope: HookScope<'_>) {
        let publisher = scope.publisher;
        let mut cx = PanelCx::<P>::new(scope, None);
        let target = cx.state.name.clone();
        let panel = &mut self.panel;
        publisher.run("Panel Predelete", &target, "on_predelete", || {
            panel.on_predelete(&mut cx)
        });
        self.open_arg = None;
        self.on_close = None;
    }
}
