//! Manually driven tweener for transition tests.

use parking_lot::Mutex;
use strata_panel::{PanelId, PanelTweener, PanelView, TweenFinish};

/// Records a tweener call for verification in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenCall {
    Init(PanelId),
    Show(PanelId),
    Hide(PanelId),
    Forget(PanelId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenKind {
    Show,
    Hide,
}

struct PendingTween {
    panel: PanelId,
    kind: TweenKind,
    on_finish: Option<TweenFinish>,
}

/// Tweener whose transitions stay in flight until completed by the test.
///
/// Visibility changes as soon as `show`/`hide` is called; only the finish
/// callbacks are held back. Starting a transition on a panel drops the one
/// already in flight for it, callback included.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// [`PanelTweener`] methods take `&self`, so recorded calls and pending
/// transitions live behind `Mutex`. Locks are released before a finish
/// callback runs.
#[derive(Default)]
pub struct ManualTweener {
    calls: Mutex<Vec<TweenCall>>,
    pending: Mutex<Vec<PendingTween>>,
}

impl ManualTweener {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&self, panel: PanelId, kind: TweenKind, on_finish: Option<TweenFinish>) {
        let mut pending = self.pending.lock();
        pending.retain(|tween| tween.panel != panel);
        pending.push(PendingTween {
            panel,
            kind,
            on_finish,
        });
    }

    /// Finishes the oldest transition in flight. Returns `false` if none.
    pub fn complete_next(&self) -> bool {
        let tween = {
            let mut pending = self.pending.lock();
            if pending.is_empty() {
                return false;
            }
            pending.remove(0)
        };
        if let Some(on_finish) = tween.on_finish {
            on_finish();
        }
        true
    }

    /// Finishes the transition in flight for `panel`, if any.
    pub fn complete(&self, panel: PanelId) -> bool {
        let tween = {
            let mut pending = self.pending.lock();
            let Some(index) = pending.iter().position(|tween| tween.panel == panel) else {
                return false;
            };
            pending.remove(index)
        };
        if let Some(on_finish) = tween.on_finish {
            on_finish();
        }
        true
    }

    /// Finishes every transition in flight, including ones started by the
    /// callbacks. Returns how many finished.
    pub fn complete_all(&self) -> usize {
        let mut count = 0;
        while self.complete_next() {
            count += 1;
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// The transition in flight for `panel`.
    pub fn pending_for(&self, panel: PanelId) -> Option<TweenKind> {
        self.pending
            .lock()
            .iter()
            .find(|tween| tween.panel == panel)
            .map(|tween| tween.kind)
    }

    pub fn calls(&self) -> Vec<TweenCall> {
        self.calls.lock().clone()
    }

    pub fn count_shows(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, TweenCall::Show(_)))
            .count()
    }

    pub fn count_hides(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, TweenCall::Hide(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl PanelTweener for ManualTweener {
    fn init(&self, panel: PanelId, _view: &mut dyn PanelView) {
        self.calls.lock().push(TweenCall::Init(panel));
    }

    fn show(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        self.calls.lock().push(TweenCall::Show(panel));
        view.set_visible(true);
        self.start(panel, TweenKind::Show, on_finish);
    }

    fn hide(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        self.calls.lock().push(TweenCall::Hide(panel));
        view.set_visible(false);
        self.start(panel, TweenKind::Hide, on_finish);
    }

    fn forget(&self, panel: PanelId) {
        self.calls.lock().push(TweenCall::Forget(panel));
        self.pending.lock().retain(|tween| tween.panel != panel);
    }
}

impl std::fmt::Debug for ManualTweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTweener")
            .field("calls", &self.calls.lock().len())
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}
