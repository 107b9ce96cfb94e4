//! Per-owner input routing.
//!
//! An [`InputRouter`] keeps, for every action name it has seen, up to three
//! delegate chains (pressed, released, any). Dispatching an event runs the
//! chain matching the event phase plus the any chain of every action the
//! event belongs to. Actions whose chains fired on press are remembered, so
//! the owner can later synthesize their release with
//! [`InputRouter::cancel_pressed`] when it loses input focus.
//!
//! `C` is the context handed to callbacks, typically a command buffer of the
//! owning panel.

use std::collections::hash_map::Entry;
use std::fmt;

use indexmap::IndexSet;
use strata_core::alloc::{HashMap, Pool, Poolable};
use strata_core::math::Vec2;
use strata_core::profiling::profile_function;
use strata_core::protected::ExceptionPublisher;

use crate::cached::CachedInputEvent;
use crate::composite::{AxisSide, AxisState, CompositeState, VectorAxis, VectorState};
use crate::event::{InputEvent, InputPhase};

/// Token returned by every registration, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

pub type InputCallback<C> = Box<dyn FnMut(&mut C, &InputEvent)>;
type CompositeCallback<C, T> = Box<dyn FnMut(&mut C, T)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AxisKey {
    negative: String,
    positive: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VectorKey {
    up: String,
    down: String,
    left: String,
    right: String,
}

enum Listener<C> {
    Callback { id: BindingId, call: InputCallback<C> },
    Axis { key: AxisKey, side: AxisSide },
    Vector {
        key: VectorKey,
        axis: VectorAxis,
        side: AxisSide,
    },
}

struct RegisteredAction<C> {
    pressed: Vec<Listener<C>>,
    released: Vec<Listener<C>>,
    any: Vec<Listener<C>>,
}

impl<C> Default for RegisteredAction<C> {
    fn default() -> Self {
        Self {
            pressed: Vec::new(),
            released: Vec::new(),
            any: Vec::new(),
        }
    }
}

impl<C: 'static> Poolable for RegisteredAction<C> {
    fn reset(&mut self) {
        self.pressed.clear();
        self.released.clear();
        self.any.clear();
    }
}

impl<C> RegisteredAction<C> {
    fn chain_mut(&mut self, phase: InputPhase) -> &mut Vec<Listener<C>> {
        match phase {
            InputPhase::Pressed => &mut self.pressed,
            InputPhase::Released => &mut self.released,
            InputPhase::Any => &mut self.any,
        }
    }

    fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.released.is_empty() && self.any.is_empty()
    }

    fn retain(&mut self, mut keep: impl FnMut(&Listener<C>) -> bool) {
        self.pressed.retain(&mut keep);
        self.released.retain(&mut keep);
        self.any.retain(&mut keep);
    }
}

struct CompositeCallbacks<C, T> {
    start: Vec<(BindingId, CompositeCallback<C, T>)>,
    update: Vec<(BindingId, CompositeCallback<C, T>)>,
    end: Vec<(BindingId, CompositeCallback<C, T>)>,
}

impl<C, T: Copy> CompositeCallbacks<C, T> {
    fn new() -> Self {
        Self {
            start: Vec::new(),
            update: Vec::new(),
            end: Vec::new(),
        }
    }

    fn push(&mut self, state: CompositeState, id: BindingId, callback: CompositeCallback<C, T>) {
        let list = match state {
            CompositeState::Start => &mut self.start,
            CompositeState::Update => &mut self.update,
            CompositeState::End => &mut self.end,
        };
        list.push((id, callback));
    }

    fn remove(&mut self, id: BindingId) {
        self.start.retain(|(cb_id, _)| *cb_id != id);
        self.update.retain(|(cb_id, _)| *cb_id != id);
        self.end.retain(|(cb_id, _)| *cb_id != id);
    }

    fn is_empty(&self) -> bool {
        self.start.is_empty() && self.update.is_empty() && self.end.is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &mut self,
        started: bool,
        updated: bool,
        ended: bool,
        value: T,
        cx: &mut C,
        publisher: &ExceptionPublisher,
        target: &str,
    ) {
        let stages = [
            (started, &mut self.start, "start"),
            (updated, &mut self.update, "update"),
            (ended, &mut self.end, "end"),
        ];
        for (fire, callbacks, method) in stages {
            if !fire {
                continue;
            }
            for (_, callback) in callbacks.iter_mut() {
                publisher.run_callback("Composite Input", target, method, || callback(cx, value));
            }
        }
    }
}

struct AxisTracker<C> {
    state: AxisState,
    callbacks: CompositeCallbacks<C, f32>,
}

struct VectorTracker<C> {
    state: VectorState,
    callbacks: CompositeCallbacks<C, Vec2>,
}

enum BindingLocation {
    Input { action: String, phase: InputPhase },
    Axis(AxisKey),
    Vector(VectorKey),
}

pub struct InputRouter<C> {
    /// Action names in first-registration order; dispatch follows it.
    order: Vec<String>,
    actions: HashMap<String, RegisteredAction<C>>,
    pressed: IndexSet<String>,
    axes: HashMap<AxisKey, AxisTracker<C>>,
    vectors: HashMap<VectorKey, VectorTracker<C>>,
    locations: HashMap<BindingId, BindingLocation>,
    next_id: u64,
}

impl<C: 'static> Default for InputRouter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> InputRouter<C> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            actions: HashMap::new(),
            pressed: IndexSet::new(),
            axes: HashMap::new(),
            vectors: HashMap::new(),
            locations: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers `callback` on `action` for events of `phase`.
    pub fn register_input(
        &mut self,
        action: impl Into<String>,
        phase: InputPhase,
        callback: impl FnMut(&mut C, &InputEvent) + 'static,
        pool: &mut Pool,
    ) -> BindingId {
        let action = action.into();
        let id = self.allocate_id();
        self.action_entry(&action, pool)
            .chain_mut(phase)
            .push(Listener::Callback {
                id,
                call: Box::new(callback),
            });
        tracing::trace!(action = %action, %phase, id = id.0, "registered input");
        self.locations
            .insert(id, BindingLocation::Input { action, phase });
        id
    }

    /// Registers a callback that ignores the event on the cancel action.
    pub fn register_cancel(
        &mut self,
        cancel_action: &str,
        phase: InputPhase,
        mut callback: impl FnMut(&mut C) + 'static,
        pool: &mut Pool,
    ) -> BindingId {
        self.register_input(cancel_action, phase, move |cx, _| callback(cx), pool)
    }

    /// Registers an axis composed of `negative` and `positive`.
    ///
    /// Every callback registered on the same pair shares one tracker.
    pub fn register_axis(
        &mut self,
        negative: impl Into<String>,
        positive: impl Into<String>,
        state: CompositeState,
        callback: impl FnMut(&mut C, f32) + 'static,
        pool: &mut Pool,
    ) -> BindingId {
        let key = AxisKey {
            negative: negative.into(),
            positive: positive.into(),
        };
        let id = self.allocate_id();
        if !self.axes.contains_key(&key) {
            for (action, side) in [
                (&key.negative, AxisSide::Negative),
                (&key.positive, AxisSide::Positive),
            ] {
                self.attach(action, pool, || Listener::Axis {
                    key: key.clone(),
                    side,
                });
            }
            self.axes.insert(
                key.clone(),
                AxisTracker {
                    state: AxisState::new(),
                    callbacks: CompositeCallbacks::new(),
                },
            );
        }
        if let Some(tracker) = self.axes.get_mut(&key) {
            tracker.callbacks.push(state, id, Box::new(callback));
        }
        self.locations.insert(id, BindingLocation::Axis(key));
        id
    }

    /// Registers a vector composed of four actions. Up is `+y`.
    #[allow(clippy::too_many_arguments)]
    pub fn register_vector(
        &mut self,
        up: impl Into<String>,
        down: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        state: CompositeState,
        callback: impl FnMut(&mut C, Vec2) + 'static,
        pool: &mut Pool,
    ) -> BindingId {
        let key = VectorKey {
            up: up.into(),
            down: down.into(),
            left: left.into(),
            right: right.into(),
        };
        let id = self.allocate_id();
        if !self.vectors.contains_key(&key) {
            for (action, axis, side) in [
                (&key.left, VectorAxis::Horizontal, AxisSide::Negative),
                (&key.right, VectorAxis::Horizontal, AxisSide::Positive),
                (&key.down, VectorAxis::Vertical, AxisSide::Negative),
                (&key.up, VectorAxis::Vertical, AxisSide::Positive),
            ] {
                self.attach(action, pool, || Listener::Vector {
                    key: key.clone(),
                    axis,
                    side,
                });
            }
            self.vectors.insert(
                key.clone(),
                VectorTracker {
                    state: VectorState::new(),
                    callbacks: CompositeCallbacks::new(),
                },
            );
        }
        if let Some(tracker) = self.vectors.get_mut(&key) {
            tracker.callbacks.push(state, id, Box::new(callback));
        }
        self.locations.insert(id, BindingLocation::Vector(key));
        id
    }

    /// Removes a plain input registration. Returns false for unknown ids
    /// and for ids of composite registrations.
    pub fn remove_input(&mut self, id: BindingId, pool: &mut Pool) -> bool {
        matches!(self.locations.get(&id), Some(BindingLocation::Input { .. }))
            && self.remove(id, pool)
    }

    /// Removes an axis callback. The tracker and its underlying bindings go
    /// away with the last callback.
    pub fn remove_axis(&mut self, id: BindingId, pool: &mut Pool) -> bool {
        matches!(self.locations.get(&id), Some(BindingLocation::Axis(_))) && self.remove(id, pool)
    }

    /// Removes a vector callback. The tracker and its underlying bindings go
    /// away with the last callback.
    pub fn remove_vector(&mut self, id: BindingId, pool: &mut Pool) -> bool {
        matches!(self.locations.get(&id), Some(BindingLocation::Vector(_))) && self.remove(id, pool)
    }

    /// Removes any registration.
    pub fn remove(&mut self, id: BindingId, pool: &mut Pool) -> bool {
        let Some(location) = self.locations.remove(&id) else {
            return false;
        };
        match location {
            BindingLocation::Input { action, phase } => {
                if let Some(entry) = self.actions.get_mut(&action) {
                    entry
                        .chain_mut(phase)
                        .retain(|l| {
                            !matches!(l, Listener::Callback { id: cb_id, .. } if *cb_id == id)
                        });
                }
                self.release_if_empty(&action, pool);
            }
            BindingLocation::Axis(key) => {
                let emptied = self.axes.get_mut(&key).is_some_and(|tracker| {
                    tracker.callbacks.remove(id);
                    tracker.callbacks.is_empty()
                });
                if emptied {
                    self.axes.remove(&key);
                    for action in [&key.negative, &key.positive] {
                        self.detach(action, pool, |l| {
                            matches!(l, Listener::Axis { key: k, .. } if *k == key)
                        });
                    }
                }
            }
            BindingLocation::Vector(key) => {
                let emptied = self.vectors.get_mut(&key).is_some_and(|tracker| {
                    tracker.callbacks.remove(id);
                    tracker.callbacks.is_empty()
                });
                if emptied {
                    self.vectors.remove(&key);
                    for action in [&key.up, &key.down, &key.left, &key.right] {
                        self.detach(action, pool, |l| {
                            matches!(l, Listener::Vector { key: k, .. } if *k == key)
                        });
                    }
                }
            }
        }
        true
    }

    /// Offers `event` to every registered action it belongs to.
    ///
    /// The phase is resolved per action, so one axis event can press one
    /// direction and release the opposite one. Presses run first. A release
    /// derived from a pressed event only reaches actions currently held.
    ///
    /// Returns whether any callback or composite listener ran.
    pub fn dispatch(
        &mut self,
        event: &mut CachedInputEvent<'_>,
        cx: &mut C,
        publisher: &ExceptionPublisher,
        target: &str,
        pool: &mut Pool,
    ) -> bool {
        profile_function!();
        let mut matched: Vec<(String, InputPhase)> = pool.get();
        for name in &self.order {
            match event.action_phase(name) {
                Some(InputPhase::Released)
                    if event.phase() == InputPhase::Pressed && !self.pressed.contains(name) => {}
                Some(phase) => matched.push((name.clone(), phase)),
                None => {}
            }
        }
        matched.sort_by_key(|(_, phase)| *phase != InputPhase::Pressed);

        let mut released = None;
        let mut handled = false;
        for (name, phase) in matched.drain(..) {
            let delivered = if phase == event.phase() {
                event.event()
            } else {
                &*released.get_or_insert_with(|| event.event().released())
            };
            if !self.call_action(&name, delivered, phase, cx, publisher, target) {
                continue;
            }
            handled = true;
            match phase {
                InputPhase::Pressed => {
                    self.pressed.insert(name);
                }
                InputPhase::Released => {
                    self.pressed.shift_remove(&name);
                }
                InputPhase::Any => {}
            }
        }
        pool.collect(matched);

        tracing::trace!(owner = target, phase = %event.phase(), handled, "dispatched input");
        handled
    }

    /// Synthesizes a release for every action currently held down.
    pub fn cancel_pressed(&mut self, cx: &mut C, publisher: &ExceptionPublisher, target: &str) {
        if self.pressed.is_empty() {
            return;
        }
        let pressed = std::mem::take(&mut self.pressed);
        tracing::debug!(owner = target, count = pressed.len(), "cancelling pressed inputs");
        for name in pressed {
            let event = InputEvent::action(name.as_str(), false);
            self.call_action(&name, &event, InputPhase::Released, cx, publisher, target);
        }
    }

    /// Drops every registration, returning tracking state to `pool`.
    pub fn clear(&mut self, pool: &mut Pool) {
        for (_, entry) in self.actions.drain() {
            pool.collect(entry);
        }
        self.order.clear();
        self.pressed.clear();
        self.axes.clear();
        self.vectors.clear();
        self.locations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn binding_count(&self) -> usize {
        self.locations.len()
    }

    pub fn has_binding(&self, id: BindingId) -> bool {
        self.locations.contains_key(&id)
    }

    pub fn is_pressed(&self, action: &str) -> bool {
        self.pressed.contains(action)
    }

    pub fn pressed_actions(&self) -> impl Iterator<Item = &str> {
        self.pressed.iter().map(String::as_str)
    }

    /// Action names with at least one listener, in registration order.
    pub fn registered_actions(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn allocate_id(&mut self) -> BindingId {
        self.next_id += 1;
        BindingId(self.next_id)
    }

    fn action_entry(&mut self, action: &str, pool: &mut Pool) -> &mut RegisteredAction<C> {
        match self.actions.entry(action.to_owned()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(action.to_owned());
                entry.insert(pool.get())
            }
        }
    }

    fn attach(&mut self, action: &str, pool: &mut Pool, listener: impl Fn() -> Listener<C>) {
        let entry = self.action_entry(action, pool);
        entry.pressed.push(listener());
        entry.released.push(listener());
    }

    fn detach(&mut self, action: &str, pool: &mut Pool, is_target: impl Fn(&Listener<C>) -> bool) {
        if let Some(entry) = self.actions.get_mut(action) {
            entry.retain(|l| !is_target(l));
        }
        self.release_if_empty(action, pool);
    }

    fn release_if_empty(&mut self, action: &str, pool: &mut Pool) {
        if !self.actions.get(action).is_some_and(RegisteredAction::is_empty) {
            return;
        }
        if let Some(entry) = self.actions.remove(action) {
            pool.collect(entry);
        }
        self.order.retain(|name| name != action);
        self.pressed.shift_remove(action);
    }

    fn call_action(
        &mut self,
        name: &str,
        event: &InputEvent,
        phase: InputPhase,
        cx: &mut C,
        publisher: &ExceptionPublisher,
        target: &str,
    ) -> bool {
        let Some(entry) = self.actions.get_mut(name) else {
            return false;
        };
        let chain = match phase {
            InputPhase::Pressed => &mut entry.pressed,
            InputPhase::Released | InputPhase::Any => &mut entry.released,
        };
        let pressed = phase == InputPhase::Pressed;

        let mut called = false;
        for listener in chain.iter_mut().chain(entry.any.iter_mut()) {
            called = true;
            match listener {
                Listener::Callback { call, .. } => {
                    publisher.run_callback("Input Call", target, name, || call(cx, event));
                }
                Listener::Axis { key, side } => {
                    if let Some(tracker) = self.axes.get_mut(key) {
                        let t = tracker.state.handle(*side, pressed, event.strength());
                        tracker
                            .callbacks
                            .emit(t.started, t.updated, t.ended, t.value, cx, publisher, target);
                    }
                }
                Listener::Vector { key, axis, side } => {
                    if let Some(tracker) = self.vectors.get_mut(key) {
                        let t = tracker.state.handle(*axis, *side, pressed, event.strength());
                        tracker
                            .callbacks
                            .emit(t.started, t.updated, t.ended, t.value, cx, publisher, target);
                    }
                }
            }
        }
        called
    }
}

impl<C> fmt::Debug for InputRouter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRouter")
            .field("actions", &self.order)
            .field("pressed", &self.pressed)
            .field("axes", &self.axes.len())
            .field("vectors", &self.vectors.len())
            .field("bindings", &self.locations.len())
            .finish()
    }
}
