//! Panel runtime - owns every panel and coordinates the open stack.
//!
//! The runtime is single-threaded. Hooks and input callbacks never touch it
//! directly: they record [`PanelCommands`] that the runtime applies once the
//! running operation has completed its own sequence.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use strata_core::alloc::{Pool, SparseSet};
use strata_core::profiling::profile_function;
use strata_core::protected::{ExceptionPublisher, ProtectedFailure};
use strata_input::{CachedInputEvent, HandleStatus, InputBatch, InputEvent, InputMap};

use crate::awaitable::{PanelClosed, close_channel};
use crate::config::RuntimeConfig;
use crate::error::{PanelError, PanelResult};
use crate::id::{ContainerId, OwnerId, PanelHandle, PanelId, TemplateId};
use crate::panel::{ErasedPanel, HookScope, OnClose, Panel, PanelBox, PanelCommands, PanelCx};
use crate::signal::PanelSignal;
use crate::state::{
    ClosePolicy, CreatePolicy, OpenOptions, PanelInput, PanelState, PanelStatus, PreviousVisual,
};
use crate::template::{PanelInstance, PanelTemplate};
use crate::tree::PanelTree;
use crate::tween::{NoneTweener, PanelTweener};
use crate::view::PanelView;

struct PanelEntry {
    state: PanelState,
    view: Box<dyn PanelView>,
    panel: Box<dyn ErasedPanel>,
}

impl PanelEntry {
    fn is<P: Panel>(&self) -> bool {
        let panel: &dyn Any = &*self.panel;
        panel.is::<PanelBox<P>>()
    }

    fn tweener(&self, default: &Rc<dyn PanelTweener>) -> Rc<dyn PanelTweener> {
        self.state
            .tweener
            .clone()
            .unwrap_or_else(|| Rc::clone(default))
    }

    fn transition_tweener(&self, default: &Rc<dyn PanelTweener>) -> Rc<dyn PanelTweener> {
        self.state
            .transition_tweener
            .clone()
            .unwrap_or_else(|| self.tweener(default))
    }

    /// Records `tweener` as the one running the panel's transitions. A
    /// different previous tweener forgets the panel.
    fn begin_transition(&mut self, id: PanelId, tweener: &Rc<dyn PanelTweener>) {
        if let Some(previous) = self.state.transition_tweener.replace(Rc::clone(tweener))
            && !Rc::ptr_eq(&previous, tweener)
        {
            previous.forget(id);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ContainerEntry {
    owner: Option<OwnerId>,
    container: ContainerId,
}

/// Orchestrates panel lifecycles, the open stack and input routing.
///
/// # Example
///
/// ```ignore
/// let mut runtime = PanelRuntime::new();
/// let menu = runtime.create_panel::<MainMenu>(&menu_template, CreatePolicy::TryReuse, |_| {})?;
/// runtime.open_panel(menu, (), OpenOptions::new())?;
///
/// // Each frame
/// runtime.handle_events(&mut batch)?;
/// runtime.update(dt);
/// ```
pub struct PanelRuntime {
    /// Every live panel, opened or not.
    panels: SparseSet<PanelEntry>,
    /// Opened panels, bottom first.
    stack: Vec<PanelId>,
    /// Closed panels waiting for reuse, per template.
    buffer: IndexMap<TemplateId, Vec<PanelId>>,
    /// Container stack; the first entry is the root and has no owner.
    containers: Vec<ContainerEntry>,
    tree: PanelTree,
    /// Scratch collections shared by input routing and bookkeeping.
    pool: Pool,
    config: RuntimeConfig,
    default_tweener: Rc<dyn PanelTweener>,
    publisher: ExceptionPublisher,
    /// Command buffers waiting to be applied.
    queued: VecDeque<PanelCommands>,
    /// Panels whose hide transition finished under the delete policy.
    deletions: Rc<RefCell<Vec<PanelId>>>,
}

impl Default for PanelRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let pool = match config.pool_limit {
            Some(limit) => Pool::bounded(limit),
            None => Pool::new(),
        };
        Self {
            panels: SparseSet::new(),
            stack: Vec::new(),
            buffer: IndexMap::new(),
            containers: vec![ContainerEntry {
                owner: None,
                container: ContainerId::ROOT,
            }],
            tree: PanelTree::new(),
            pool,
            config,
            default_tweener: Rc::new(NoneTweener),
            publisher: ExceptionPublisher::new(),
            queued: VecDeque::new(),
            deletions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn default_tweener(&self) -> Rc<dyn PanelTweener> {
        Rc::clone(&self.default_tweener)
    }

    /// Sets the tweener used by panels without an override. `None` restores
    /// the immediate tweener.
    pub fn set_default_tweener(&mut self, tweener: Option<Rc<dyn PanelTweener>>) {
        self.default_tweener = tweener.unwrap_or_else(|| Rc::new(NoneTweener));
    }

    pub fn cancel_action(&self) -> &str {
        &self.config.cancel_action
    }

    /// Changes the cancel action for registrations made from now on.
    pub fn set_cancel_action(&mut self, action: impl Into<String>) {
        self.config.cancel_action = action.into();
    }

    pub fn input_map(&self) -> &InputMap {
        &self.config.input_map
    }

    pub fn input_map_mut(&mut self) -> &mut InputMap {
        &mut self.config.input_map
    }

    /// Routes hook and callback failures to `handler` instead of the log.
    pub fn set_exception_handler(&mut self, handler: impl Fn(&ProtectedFailure<'_>) + 'static) {
        self.publisher.set_handler(handler);
    }

    pub fn clear_exception_handler(&mut self) {
        self.publisher.clear_handler();
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Creates a panel of type `P` from `template`, or reuses a buffered one.
    ///
    /// `init` runs before `on_initialize` for new instances, and right away
    /// for reused ones, which are not initialized again.
    pub fn create_panel<P: Panel>(
        &mut self,
        template: &PanelTemplate,
        policy: CreatePolicy,
        init: impl FnOnce(&mut P),
    ) -> PanelResult<PanelHandle<P>> {
        profile_function!();

        if policy == CreatePolicy::TryReuse {
            if let Some(id) = self.take_buffered::<P>(template)? {
                if let Some(panel) = self.panel_box_mut::<P>(id) {
                    init(&mut panel.panel);
                }
                tracing::debug!(panel = %id, template = template.name(), "reused buffered panel");
                return Ok(PanelHandle::new(id));
            }
        }

        let invalid = |reason| PanelError::InvalidTemplate {
            template: template.name().to_owned(),
            expected: type_name::<P>(),
            reason,
        };
        let instance = template
            .instantiate()
            .ok_or_else(|| invalid("factory produced no instance"))?;
        let PanelInstance { name, panel, view } = instance;
        let erased: &dyn Any = &*panel;
        if !erased.is::<PanelBox<P>>() {
            return Err(invalid("factory produced a different panel type"));
        }

        let id = PanelId(self.panels.push(PanelEntry {
            state: PanelState::new(name),
            view,
            panel,
        }));
        let container = self.current_container();
        self.tree.attach(id, container);
        if let Some(panel) = self.panel_box_mut::<P>(id) {
            init(&mut panel.panel);
        }
        self.initialize_panel::<P>(id, template.id())?;
        tracing::debug!(panel = %id, template = template.name(), "created panel");

        self.finish_operation()?;
        Ok(PanelHandle::new(id))
    }

    fn take_buffered<P: Panel>(
        &mut self,
        template: &PanelTemplate,
    ) -> PanelResult<Option<PanelId>> {
        let Some(list) = self.buffer.get_mut(&template.id()) else {
            return Ok(None);
        };
        let Some(&id) = list.last() else {
            return Ok(None);
        };
        if !self.panels.try_get(id.0).is_some_and(PanelEntry::is::<P>) {
            return Err(PanelError::InvalidTemplate {
                template: template.name().to_owned(),
                expected: type_name::<P>(),
                reason: "buffered instance has a different panel type",
            });
        }
        list.pop();
        if list.is_empty() {
            if let Some(list) = self.buffer.shift_remove(&template.id()) {
                self.pool.collect(list);
            }
        }
        Ok(Some(id))
    }

    fn initialize_panel<P: Panel>(&mut self, id: PanelId, template: TemplateId) -> PanelResult<()> {
        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        entry.state.template = Some(template);
        self.deactivate_panel(id, PreviousVisual::Hidden, true)?;

        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        entry.state.status = PanelStatus::Initialized;

        let PanelEntry { state, view, panel } = entry;
        let mut commands = PanelCommands::new(id);
        if let Some(panel) = downcast_box_mut::<P>(panel.as_mut()) {
            panel.initialize(HookScope {
                id,
                state: &mut *state,
                view: view.as_mut(),
                commands: &mut commands,
                pool: &mut self.pool,
                cancel_action: &self.config.cancel_action,
                publisher: &self.publisher,
            });
        }
        let tweener = state
            .tweener
            .clone()
            .unwrap_or_else(|| Rc::clone(&self.default_tweener));
        tweener.init(id, view.as_mut());
        self.queue(commands);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Opening
    // ---------------------------------------------------------------------

    /// Opens `handle` on top of the stack.
    pub fn open_panel<P: Panel>(
        &mut self,
        handle: PanelHandle<P>,
        arg: P::OpenArg,
        options: OpenOptions,
    ) -> PanelResult<()> {
        self.open_typed::<P>(handle.id(), arg, options, None)?;
        self.finish_operation()
    }

    /// Opens `handle` and calls `on_close` with the close argument, after the
    /// panel has been popped and the panel beneath reactivated.
    pub fn open_panel_with<P: Panel>(
        &mut self,
        handle: PanelHandle<P>,
        arg: P::OpenArg,
        options: OpenOptions,
        on_close: impl FnOnce(&mut PanelRuntime, P::CloseArg) + 'static,
    ) -> PanelResult<()> {
        let on_close = OnClose::Callback(Box::new(on_close));
        self.open_typed::<P>(handle.id(), arg, options, Some(on_close))?;
        self.finish_operation()
    }

    /// Opens `handle` and returns a future resolving to the close argument.
    ///
    /// The future resolves to `None` if the panel is destroyed before it
    /// closes.
    pub fn open_panel_async<P: Panel>(
        &mut self,
        handle: PanelHandle<P>,
        arg: P::OpenArg,
        options: OpenOptions,
    ) -> PanelResult<PanelClosed<P::CloseArg>> {
        let (notifier, closed) = close_channel();
        self.open_typed::<P>(handle.id(), arg, options, Some(OnClose::Future(notifier)))?;
        self.finish_operation()?;
        Ok(closed)
    }

    fn open_typed<P: Panel>(
        &mut self,
        id: PanelId,
        arg: P::OpenArg,
        options: OpenOptions,
        on_close: Option<OnClose<P::CloseArg>>,
    ) -> PanelResult<()> {
        profile_function!();

        let entry = self
            .panels
            .try_get(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        match entry.state.status {
            PanelStatus::Uninitialized => return Err(PanelError::Uninitialized { panel: id }),
            PanelStatus::Opened => return Err(PanelError::AlreadyOpened { panel: id }),
            PanelStatus::Initialized | PanelStatus::Closed => {}
        }
        if entry.state.pending_delete {
            return Err(PanelError::PendingDeletion { panel: id });
        }
        if !entry.is::<P>() {
            return Err(PanelError::ArgumentType {
                panel: id,
                expected: type_name::<P::OpenArg>(),
            });
        }

        self.unbuffer(id);
        self.push_to_stack(id, options.previous_visual)?;

        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        let tweener = entry.tweener(&self.default_tweener);
        entry.begin_transition(id, &tweener);
        let PanelEntry { state, view, panel } = entry;

        state.options = Some(options);
        state.status = PanelStatus::Opened;
        state.close_requested.arm();
        state.shown = true;
        let finished = state.open_transition.arm();
        tweener.show(id, view.as_mut(), Some(Box::new(move || finished.fire())));
        view.set_children_interactive(true);

        let mut commands = PanelCommands::new(id);
        if let Some(panel) = downcast_box_mut::<P>(panel.as_mut()) {
            panel.open(
                HookScope {
                    id,
                    state,
                    view: view.as_mut(),
                    commands: &mut commands,
                    pool: &mut self.pool,
                    cancel_action: &self.config.cancel_action,
                    publisher: &self.publisher,
                },
                arg,
                on_close,
            );
        }
        self.queue(commands);
        tracing::debug!(panel = %id, depth = self.stack.len(), "opened panel");
        Ok(())
    }

    fn push_to_stack(&mut self, id: PanelId, previous_visual: PreviousVisual) -> PanelResult<()> {
        let container = self.current_container();
        if self.tree.parent_of(id) == Some(container) {
            self.tree.raise(id);
        } else {
            self.tree.attach(id, container);
        }
        if let Some(&previous) = self.stack.last() {
            self.deactivate_panel(previous, previous_visual, false)?;
        }
        self.stack.push(id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Closing
    // ---------------------------------------------------------------------

    /// Closes `handle` with `arg`.
    ///
    /// Returns `Ok(false)` when the panel is not opened. Only the top of the
    /// stack may close; anything else fails with [`PanelError::ClosingOrder`]
    /// and leaves the stack untouched.
    pub fn close_panel<P: Panel>(
        &mut self,
        handle: PanelHandle<P>,
        arg: P::CloseArg,
    ) -> PanelResult<bool> {
        let closed = self.close_erased(handle.id(), Box::new(arg))?;
        self.finish_operation()?;
        Ok(closed)
    }

    fn close_erased(&mut self, id: PanelId, arg: Box<dyn Any>) -> PanelResult<bool> {
        profile_function!();

        let entry = self
            .panels
            .try_get(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        if entry.state.status != PanelStatus::Opened {
            tracing::debug!(panel = %id, status = ?entry.state.status, "close ignored");
            return Ok(false);
        }
        let top = self.stack.last().copied();
        if top != Some(id) {
            return Err(PanelError::ClosingOrder { panel: id, top });
        }
        if !entry.panel.accepts_close_arg(arg.as_ref()) {
            return Err(PanelError::ArgumentType {
                panel: id,
                expected: entry.panel.close_arg_type_name(),
            });
        }

        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        let tweener = entry.tweener(&self.default_tweener);
        let PanelEntry { state, view, panel } = entry;

        state.status = PanelStatus::Closed;
        let hidden = state.close_transition.arm();
        state.close_requested.fire();

        let mut commands = PanelCommands::new(id);
        let continuation = panel.close(
            HookScope {
                id,
                state: &mut *state,
                view: view.as_mut(),
                commands: &mut commands,
                pool: &mut self.pool,
                cancel_action: &self.config.cancel_action,
                publisher: &self.publisher,
            },
            arg,
        );
        view.set_children_interactive(false);
        let options = state.options.take().unwrap_or_default();
        self.queue(commands);

        self.handle_panel_close(id, options)?;

        if let Some(entry) = self.panels.try_get_mut(id.0) {
            entry.state.shown = false;
            entry.begin_transition(id, &tweener);
            tweener.hide(id, entry.view.as_mut(), Some(Box::new(move || hidden.fire())));
        }
        tracing::debug!(panel = %id, depth = self.stack.len(), "closed panel");

        if let Some(continuation) = continuation {
            continuation(self);
        }
        Ok(true)
    }

    /// Pops `id`, reactivates the panel beneath and applies the close policy.
    fn handle_panel_close(&mut self, id: PanelId, options: OpenOptions) -> PanelResult<()> {
        let top = self.stack.last().copied();
        if top != Some(id) {
            return Err(PanelError::ClosingOrder { panel: id, top });
        }
        self.stack.pop();
        if let Some(&next) = self.stack.last() {
            self.activate_panel(next)?;
        }

        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        match options.close_policy {
            ClosePolicy::Delete => {
                entry.state.pending_delete = true;
                let deletions = Rc::clone(&self.deletions);
                entry
                    .state
                    .close_transition
                    .signal()
                    .on_fire(move || deletions.borrow_mut().push(id));
            }
            ClosePolicy::Cache => {
                if let Some(template) = entry.state.template {
                    self.buffer
                        .entry(template)
                        .or_insert_with(|| self.pool.get())
                        .push(id);
                }
                self.tree.attach(id, ContainerId::ROOT);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Activation
    // ---------------------------------------------------------------------

    fn activate_panel(&mut self, id: PanelId) -> PanelResult<()> {
        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        entry.view.set_children_interactive(true);
        if !entry.state.shown {
            entry.state.shown = true;
            let tweener = entry.tweener(&self.default_tweener);
            entry.begin_transition(id, &tweener);
            tweener.show(id, entry.view.as_mut(), None);
        }
        if let Some(child) = entry.state.cached_focus.take() {
            if !entry.view.grab_focus(child) {
                tracing::debug!(panel = %id, %child, "cached focus is no longer focusable");
            }
        }
        Ok(())
    }

    fn deactivate_panel(
        &mut self,
        id: PanelId,
        visual: PreviousVisual,
        instant: bool,
    ) -> PanelResult<()> {
        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        if let Some(child) = entry.view.focused_child() {
            entry.state.cached_focus = Some(child);
        }

        let mut commands = PanelCommands::new(id);
        entry
            .state
            .input
            .cancel_pressed(&mut commands, &self.publisher, &entry.state.name);

        if visual == PreviousVisual::Hidden {
            entry.state.shown = false;
            let tweener: Rc<dyn PanelTweener> = if instant {
                Rc::new(NoneTweener)
            } else {
                entry.tweener(&self.default_tweener)
            };
            entry.begin_transition(id, &tweener);
            tweener.hide(id, entry.view.as_mut(), None);
        }
        entry.view.set_children_interactive(false);
        self.queue(commands);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    /// Offers `event` to the top panel. Returns whether anything handled it.
    pub fn process_input(&mut self, event: &InputEvent) -> PanelResult<bool> {
        profile_function!();
        let Some(&top) = self.stack.last() else {
            return Ok(false);
        };
        let Some(entry) = self.panels.try_get_mut(top.0) else {
            return Ok(false);
        };

        let mut commands = PanelCommands::new(top);
        let mut cached = CachedInputEvent::new(event, &self.config.input_map, &mut self.pool);
        let handled = entry.state.input.dispatch(
            &mut cached,
            &mut commands,
            &self.publisher,
            &entry.state.name,
            &mut self.pool,
        );
        cached.release(&mut self.pool);
        self.queue(commands);

        self.finish_operation()?;
        Ok(handled)
    }

    /// Routes a batch of events, removing the ones a panel handled.
    ///
    /// Every event is offered even after a failure; the first error is
    /// returned.
    pub fn handle_events(&mut self, batch: &mut InputBatch) -> PanelResult<()> {
        let mut result = Ok(());
        batch.dispatch(|event| match self.process_input(event) {
            Ok(handled) => HandleStatus::from_consumed(handled),
            Err(err) => {
                if result.is_ok() {
                    result = Err(err);
                }
                HandleStatus::ignored()
            }
        });
        result
    }

    /// Releases every held action of every panel, e.g. when the window
    /// loses focus.
    pub fn notify_focus_lost(&mut self) -> PanelResult<()> {
        profile_function!();
        let mut ids: Vec<PanelId> = self.pool.get();
        ids.extend(self.panels.slots().map(PanelId));
        for &id in &ids {
            let Some(entry) = self.panels.try_get_mut(id.0) else {
                continue;
            };
            let mut commands = PanelCommands::new(id);
            entry
                .state
                .input
                .cancel_pressed(&mut commands, &self.publisher, &entry.state.name);
            self.queue(commands);
        }
        self.pool.collect(ids);
        self.finish_operation()
    }

    // ---------------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------------

    /// Advances tweeners by `dt` seconds and destroys panels whose hide
    /// transition finished.
    pub fn update(&mut self, dt: f32) {
        profile_function!();
        let mut ids: Vec<PanelId> = self.pool.get();
        ids.extend(self.panels.slots().map(PanelId));
        for &id in &ids {
            if let Some(entry) = self.panels.try_get_mut(id.0) {
                let tweener = entry.transition_tweener(&self.default_tweener);
                tweener.advance(id, entry.view.as_mut(), dt);
            }
        }
        self.pool.collect(ids);

        self.flush_deletions();
        if let Some(high_water) = self.config.pool_high_water {
            self.pool.trim(high_water);
        }
    }

    /// Destroys every panel whose deletion is due.
    pub fn flush_deletions(&mut self) {
        loop {
            let pending = std::mem::take(&mut *self.deletions.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for id in pending {
                self.destroy_entry(id);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    fn queue(&mut self, commands: PanelCommands) {
        if !commands.is_empty() {
            self.queued.push_back(commands);
        }
    }

    fn finish_operation(&mut self) -> PanelResult<()> {
        let result = self.run_queued();
        self.flush_deletions();
        result
    }

    fn run_queued(&mut self) -> PanelResult<()> {
        let mut result = Ok(());
        while let Some(commands) = self.queued.pop_front() {
            if let Err(err) = self.apply_commands(commands) {
                tracing::error!(%err, "panel command failed");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    fn apply_commands(&mut self, mut commands: PanelCommands) -> PanelResult<()> {
        let id = commands.panel();
        let (close, deferred) = commands.take();
        let mut result = Ok(());
        if let Some(arg) = close {
            if let Err(err) = self.close_erased(id, arg) {
                result = Err(err);
            }
        }
        for task in deferred {
            if let Err(err) = task(self) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Runs `f` with the panel and a hook context outside of any hook, e.g.
    /// to register input from host code. Commands it records are applied
    /// before returning.
    pub fn with_panel<P: Panel, R>(
        &mut self,
        handle: PanelHandle<P>,
        f: impl FnOnce(&mut P, &mut PanelCx<'_, P>) -> R,
    ) -> PanelResult<R> {
        let id = handle.id();
        let entry = self
            .panels
            .try_get_mut(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        let PanelEntry { state, view, panel } = entry;
        let panel =
            downcast_box_mut::<P>(panel.as_mut()).ok_or(PanelError::StalePanel { panel: id })?;
        let PanelBox { panel, open_arg, .. } = panel;

        let mut commands = PanelCommands::new(id);
        let result = {
            let mut cx = PanelCx::<P>::new(
                HookScope {
                    id,
                    state,
                    view: view.as_mut(),
                    commands: &mut commands,
                    pool: &mut self.pool,
                    cancel_action: &self.config.cancel_action,
                    publisher: &self.publisher,
                },
                open_arg.as_ref(),
            );
            f(panel, &mut cx)
        };
        self.queue(commands);
        self.finish_operation()?;
        Ok(result)
    }

    // ---------------------------------------------------------------------
    // Containers
    // ---------------------------------------------------------------------

    pub fn create_container(&mut self, name: impl Into<String>) -> ContainerId {
        self.tree.create_container(name)
    }

    /// Makes `container` the parent for panels created or opened from now on.
    pub fn push_container(
        &mut self,
        owner: impl Into<OwnerId>,
        container: ContainerId,
    ) -> PanelResult<()> {
        if !self.tree.contains_container(container) {
            return Err(PanelError::UnknownContainer { container });
        }
        let owner = owner.into();
        tracing::debug!(%container, ?owner, "pushed container");
        self.containers.push(ContainerEntry {
            owner: Some(owner),
            container,
        });
        Ok(())
    }

    /// Pops the current container. Only the owner that pushed it may pop it;
    /// panels left under it move back to the root.
    pub fn pop_container(&mut self, requester: impl Into<OwnerId>) -> PanelResult<ContainerId> {
        let requester = requester.into();
        let current = self.containers.last().copied().unwrap_or(ContainerEntry {
            owner: None,
            container: ContainerId::ROOT,
        });
        if self.containers.len() <= 1 || current.owner != Some(requester) {
            return Err(PanelError::UnauthorizedOwner {
                requester,
                owner: current.owner,
                container: current.container,
            });
        }
        self.containers.pop();
        self.tree.move_children(current.container, ContainerId::ROOT);
        tracing::debug!(container = %current.container, "popped container");
        Ok(current.container)
    }

    pub fn current_container(&self) -> ContainerId {
        self.containers
            .last()
            .map_or(ContainerId::ROOT, |entry| entry.container)
    }

    /// Number of pushed containers above the root.
    pub fn container_depth(&self) -> usize {
        self.containers.len() - 1
    }

    pub fn tree(&self) -> &PanelTree {
        &self.tree
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Destroys a panel that is not opened, running its predelete hook.
    pub fn destroy_panel(&mut self, id: impl Into<PanelId>) -> PanelResult<()> {
        let id = id.into();
        let entry = self
            .panels
            .try_get(id.0)
            .ok_or(PanelError::StalePanel { panel: id })?;
        if entry.state.status == PanelStatus::Opened {
            return Err(PanelError::StillOpen { panel: id });
        }
        self.destroy_entry(id);
        Ok(())
    }

    /// Destroys every buffered panel.
    pub fn clear_buffer(&mut self) {
        let mut ids: Vec<PanelId> = self.pool.get();
        for (_, list) in self.buffer.drain(..) {
            ids.extend_from_slice(&list);
            self.pool.collect(list);
        }
        for &id in &ids {
            self.destroy_entry(id);
        }
        self.pool.collect(ids);
    }

    /// Destroys every panel, top of the stack first, and resets containers.
    pub fn shutdown(&mut self) {
        profile_function!();
        while let Some(id) = self.stack.pop() {
            self.destroy_entry(id);
        }
        self.clear_buffer();
        let remaining: Vec<PanelId> = self.panels.slots().map(PanelId).collect();
        for id in remaining {
            self.destroy_entry(id);
        }
        self.queued.clear();
        self.deletions.borrow_mut().clear();
        self.containers.truncate(1);
        tracing::debug!("panel runtime shut down");
    }

    fn destroy_entry(&mut self, id: PanelId) {
        let Some(mut entry) = self.panels.try_remove(id.0) else {
            return;
        };
        let current = entry.tweener(&self.default_tweener);
        let running = entry.transition_tweener(&self.default_tweener);
        let PanelEntry { state, view, panel } = &mut entry;

        let mut commands = PanelCommands::new(id);
        panel.predelete(HookScope {
            id,
            state: &mut *state,
            view: view.as_mut(),
            commands: &mut commands,
            pool: &mut self.pool,
            cancel_action: &self.config.cancel_action,
            publisher: &self.publisher,
        });
        if !commands.is_empty() {
            tracing::warn!(panel = %id, "commands recorded during predelete are dropped");
        }

        state.input.clear(&mut self.pool);
        state.dispose();
        running.forget(id);
        if !Rc::ptr_eq(&running, &current) {
            current.forget(id);
        }
        self.tree.detach(id);
        self.unbuffer(id);
        self.stack.retain(|&open| open != id);
        tracing::debug!(panel = %id, name = %state.name, "destroyed panel");
    }

    fn unbuffer(&mut self, id: PanelId) {
        let Some(template) = self.panels.try_get(id.0).and_then(|e| e.state.template) else {
            self.buffer.values_mut().for_each(|list| list.retain(|&p| p != id));
            self.buffer.retain(|_, list| !list.is_empty());
            return;
        };
        if let Some(list) = self.buffer.get_mut(&template) {
            list.retain(|&p| p != id);
            if list.is_empty() {
                if let Some(list) = self.buffer.shift_remove(&template) {
                    self.pool.collect(list);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Opened panels, bottom first.
    pub fn stack(&self) -> &[PanelId] {
        &self.stack
    }

    pub fn top(&self) -> Option<PanelId> {
        self.stack.last().copied()
    }

    pub fn contains(&self, id: impl Into<PanelId>) -> bool {
        self.panels.contains(id.into().0)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn status(&self, id: impl Into<PanelId>) -> Option<PanelStatus> {
        self.panels.try_get(id.into().0).map(|e| e.state.status)
    }

    pub fn name(&self, id: impl Into<PanelId>) -> Option<&str> {
        self.panels.try_get(id.into().0).map(|e| e.state.name.as_str())
    }

    pub fn is_pending_deletion(&self, id: impl Into<PanelId>) -> bool {
        self.panels
            .try_get(id.into().0)
            .is_some_and(|e| e.state.pending_delete)
    }

    pub fn is_buffered(&self, id: impl Into<PanelId>) -> bool {
        let id = id.into();
        self.buffer.values().any(|list| list.contains(&id))
    }

    pub fn buffered_count(&self, template: &PanelTemplate) -> usize {
        self.buffer.get(&template.id()).map_or(0, Vec::len)
    }

    pub fn panel<P: Panel>(&self, handle: PanelHandle<P>) -> Option<&P> {
        let entry = self.panels.try_get(handle.id().0)?;
        let panel: &dyn Any = &*entry.panel;
        panel.downcast_ref::<PanelBox<P>>().map(|b| &b.panel)
    }

    pub fn panel_mut<P: Panel>(&mut self, handle: PanelHandle<P>) -> Option<&mut P> {
        self.panel_box_mut::<P>(handle.id()).map(|b| &mut b.panel)
    }

    /// The argument of the current open, while the panel is opened.
    pub fn open_arg<P: Panel>(&self, handle: PanelHandle<P>) -> Option<&P::OpenArg> {
        let entry = self.panels.try_get(handle.id().0)?;
        let panel: &dyn Any = &*entry.panel;
        panel.downcast_ref::<PanelBox<P>>()?.open_arg.as_ref()
    }

    pub fn view(&self, id: impl Into<PanelId>) -> Option<&dyn PanelView> {
        self.panels.try_get(id.into().0).map(|e| &*e.view as &dyn PanelView)
    }

    pub fn view_as<V: PanelView>(&self, id: impl Into<PanelId>) -> Option<&V> {
        let view: &dyn Any = &*self.panels.try_get(id.into().0)?.view;
        view.downcast_ref::<V>()
    }

    pub fn view_as_mut<V: PanelView>(&mut self, id: impl Into<PanelId>) -> Option<&mut V> {
        let view: &mut dyn Any = &mut *self.panels.try_get_mut(id.into().0)?.view;
        view.downcast_mut::<V>()
    }

    pub fn input(&self, id: impl Into<PanelId>) -> Option<&PanelInput> {
        self.panels.try_get(id.into().0).map(|e| &e.state.input)
    }

    pub fn close_requested(&self, id: impl Into<PanelId>) -> Option<PanelSignal> {
        self.panels
            .try_get(id.into().0)
            .map(|e| e.state.close_requested.signal())
    }

    pub fn open_transition_finished(&self, id: impl Into<PanelId>) -> Option<PanelSignal> {
        self.panels
            .try_get(id.into().0)
            .map(|e| e.state.open_transition.signal())
    }

    pub fn close_transition_finished(&self, id: impl Into<PanelId>) -> Option<PanelSignal> {
        self.panels
            .try_get(id.into().0)
            .map(|e| e.state.close_transition.signal())
    }

    fn panel_box_mut<P: Panel>(&mut self, id: PanelId) -> Option<&mut PanelBox<P>> {
        let entry = self.panels.try_get_mut(id.0)?;
        downcast_box_mut::<P>(entry.panel.as_mut())
    }
}

fn downcast_box_mut<P: Panel>(panel: &mut dyn ErasedPanel) -> Option<&mut PanelBox<P>> {
    let panel: &mut dyn Any = panel;
    panel.downcast_mut::<PanelBox<P>>()
}

impl fmt::Debug for PanelRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelRuntime")
            .field("panels", &self.panels.len())
            .field("stack", &self.stack)
            .field("buffered", &self.buffer.values().map(Vec::len).sum::<usize>())
            .field("container", &self.current_container())
            .field("queued", &self.queued.len())
            .finish()
    }
}
