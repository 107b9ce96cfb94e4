//! Per-event memo of action matches.

use strata_core::alloc::{HashMap, Pool};

use crate::action_map::ActionMatcher;
use crate::event::{InputEvent, InputPhase};

/// Wraps an event during dispatch and remembers which actions it matched,
/// and in which phase.
///
/// The memo map is borrowed from a [`Pool`] and must be handed back with
/// [`CachedInputEvent::release`].
pub struct CachedInputEvent<'a> {
    event: &'a InputEvent,
    matcher: &'a dyn ActionMatcher,
    matches: HashMap<String, Option<InputPhase>>,
}

impl<'a> CachedInputEvent<'a> {
    pub fn new(event: &'a InputEvent, matcher: &'a dyn ActionMatcher, pool: &mut Pool) -> Self {
        Self {
            event,
            matcher,
            matches: pool.get(),
        }
    }

    pub fn event(&self) -> &'a InputEvent {
        self.event
    }

    pub fn phase(&self) -> InputPhase {
        self.event.phase()
    }

    /// Phase of the event for `action`; `None` if it is not bound to it.
    pub fn action_phase(&mut self, action: &str) -> Option<InputPhase> {
        if let Some(&phase) = self.matches.get(action) {
            return phase;
        }
        let phase = self.matcher.action_phase(action, self.event);
        self.matches.insert(action.to_owned(), phase);
        phase
    }

    pub fn action_has_event(&mut self, action: &str) -> bool {
        self.action_phase(action).is_some()
    }

    /// Returns the memo map to `pool`.
    pub fn release(self, pool: &mut Pool) {
        pool.collect(self.matches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_map::{InputMap, actions};
    use std::cell::Cell;

    struct CountingMatcher {
        inner: InputMap,
        calls: Cell<usize>,
    }

    impl ActionMatcher for CountingMatcher {
        fn action_phase(&self, action: &str, event: &InputEvent) -> Option<InputPhase> {
            self.calls.set(self.calls.get() + 1);
            self.inner.action_phase(action, event)
        }
    }

    #[test]
    fn test_match_is_memoized() {
        let matcher = CountingMatcher {
            inner: InputMap::with_ui_defaults(),
            calls: Cell::new(0),
        };
        let mut pool = Pool::new();
        let event = InputEvent::key_pressed("Escape");

        let mut cached = CachedInputEvent::new(&event, &matcher, &mut pool);
        assert!(cached.action_has_event(actions::UI_CANCEL));
        assert!(cached.action_has_event(actions::UI_CANCEL));
        assert!(!cached.action_has_event(actions::UI_ACCEPT));
        assert_eq!(matcher.calls.get(), 2);

        cached.release(&mut pool);
        assert_eq!(pool.available::<HashMap<String, Option<InputPhase>>>(), 1);
    }
}
