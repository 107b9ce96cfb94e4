//! Single-shot transition signals.
//!
//! Each panel owns three signals: close requested, open transition finished
//! and close transition finished. A signal fires at most once. The panel
//! re-arms a fired signal with a fresh one when the next transition begins,
//! so observers always hold the signal of the transition they asked about.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

type Listener = Box<dyn FnOnce()>;

#[derive(Default)]
struct SignalInner {
    fired: Cell<bool>,
    disposed: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
    waiters: RefCell<Vec<oneshot::Sender<()>>>,
}

/// Observer side of a single-shot signal.
#[derive(Clone)]
pub struct PanelSignal {
    inner: Rc<SignalInner>,
}

impl PanelSignal {
    pub fn is_fired(&self) -> bool {
        self.inner.fired.get()
    }

    /// True once the owning panel was destroyed without firing the signal.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Runs `listener` when the signal fires, or right away if it already has.
    ///
    /// Listeners attached to a disposed signal are dropped.
    pub fn on_fire(&self, listener: impl FnOnce() + 'static) {
        if self.is_fired() {
            listener();
        } else if !self.is_disposed() {
            self.inner.listeners.borrow_mut().push(Box::new(listener));
        }
    }

    /// Future resolving when the signal fires.
    ///
    /// Resolves to `false` if the signal is disposed instead.
    pub fn wait(&self) -> SignalWait {
        if self.is_fired() {
            return SignalWait::ready(true);
        }
        if self.is_disposed() {
            return SignalWait::ready(false);
        }
        let (sender, receiver) = oneshot::channel();
        self.inner.waiters.borrow_mut().push(sender);
        SignalWait {
            receiver: Some(receiver),
            resolved: false,
        }
    }
}

impl fmt::Debug for PanelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelSignal")
            .field("fired", &self.is_fired())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Owner side of a single-shot signal.
#[derive(Clone, Default)]
pub(crate) struct SignalSource {
    inner: Rc<SignalInner>,
}

impl SignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> PanelSignal {
        PanelSignal {
            inner: self.inner.clone(),
        }
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.get()
    }

    /// Fires the signal. Later calls do nothing.
    pub fn fire(&self) {
        if self.inner.disposed.get() || self.inner.fired.replace(true) {
            return;
        }
        let listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        for listener in listeners {
            listener();
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    /// Replaces a fired source with a fresh one and returns a handle to the
    /// current source.
    pub fn arm(&mut self) -> SignalSource {
        if self.is_fired() || self.inner.disposed.get() {
            *self = SignalSource::new();
        }
        self.clone()
    }

    /// Drops pending listeners without firing. Waiters resolve to `false`.
    pub fn dispose(&self) {
        if self.inner.fired.get() || self.inner.disposed.replace(true) {
            return;
        }
        self.inner.listeners.borrow_mut().clear();
        self.inner.waiters.borrow_mut().clear();
    }
}

/// Future returned by [`PanelSignal::wait`].
///
/// Resolves to `true` if the signal fired and `false` if it was disposed.
#[derive(Debug)]
pub struct SignalWait {
    receiver: Option<oneshot::Receiver<()>>,
    resolved: bool,
}

impl SignalWait {
    fn ready(fired: bool) -> Self {
        Self {
            receiver: None,
            resolved: fired,
        }
    }
}

impl Future for SignalWait {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Poll::Ready(self.resolved);
        };
        let fired = std::task::ready!(Pin::new(receiver).poll(cx)).is_ok();
        self.receiver = None;
        self.resolved = fired;
        Poll::Ready(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future;

    #[test]
    fn test_fire_runs_listeners_once() {
        let source = SignalSource::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        source.signal().on_fire(move || c.set(c.get() + 1));

        source.fire();
        source.fire();
        assert_eq!(count.get(), 1);
        assert!(source.signal().is_fired());
    }

    #[test]
    fn test_listener_after_fire_runs_immediately() {
        let source = SignalSource::new();
        source.fire();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        source.signal().on_fire(move || r.set(true));
        assert!(ran.get());
    }

    #[test]
    fn test_arm_replaces_fired_source() {
        let mut source = SignalSource::new();
        let first = source.arm().signal();
        assert!(!source.arm().signal().is_fired());

        source.fire();
        let second = source.arm().signal();
        assert!(first.is_fired());
        assert!(!second.is_fired());
    }

    #[test]
    fn test_wait_resolves_on_fire() {
        let source = SignalSource::new();
        let mut wait = source.signal().wait();
        assert_eq!(future::block_on(future::poll_once(&mut wait)), None);
        source.fire();
        assert_eq!(future::block_on(wait), true);
    }

    #[test]
    fn test_dispose_resolves_waiters_false() {
        let source = SignalSource::new();
        let signal = source.signal();
        source.dispose();
        assert!(signal.is_disposed());
        assert!(!future::block_on(signal.wait()));
    }

    #[test]
    fn test_dispose_resolves_pending_wait_false() {
        let source = SignalSource::new();
        let mut wait = source.signal().wait();
        assert_eq!(future::block_on(future::poll_once(&mut wait)), None);
        source.dispose();
        assert!(!future::block_on(wait));
    }

    #[test]
    fn test_wait_after_fire_is_ready() {
        let source = SignalSource::new();
        source.fire();
        assert!(pollster::block_on(source.signal().wait()));
    }
}
