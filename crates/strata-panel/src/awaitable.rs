//! Callback to future bridge for panel close results.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

/// Resolves with the close argument once the panel it was opened for closes.
///
/// Created by [`PanelRuntime::open_panel_async`](crate::PanelRuntime::open_panel_async).
/// Resolves to `None` if the panel is destroyed without ever closing.
pub struct PanelClosed<T> {
    receiver: oneshot::Receiver<T>,
}

/// Completing side of a [`PanelClosed`]. Dropping it uncompleted cancels the
/// receiver.
pub(crate) struct CloseNotifier<T> {
    sender: oneshot::Sender<T>,
}

pub(crate) fn close_channel<T>() -> (CloseNotifier<T>, PanelClosed<T>) {
    let (sender, receiver) = oneshot::channel();
    (CloseNotifier { sender }, PanelClosed { receiver })
}

impl<T> CloseNotifier<T> {
    pub fn complete(self, value: T) {
        // The receiver may already be gone; nobody is waiting then.
        let _ = self.sender.send(value);
    }
}

impl<T> PanelClosed<T> {
    /// Takes the close argument without awaiting, if the panel has closed.
    pub fn try_take(&mut self) -> Option<T> {
        self.receiver.try_recv().ok().flatten()
    }
}

impl<T> Future for PanelClosed<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
    }
}

impl<T> fmt::Debug for PanelClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelClosed").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future;

    #[test]
    fn test_completes_once() {
        let (notifier, mut closed) = close_channel::<u32>();
        assert_eq!(future::block_on(future::poll_once(&mut closed)), None);
        notifier.complete(5);
        assert_eq!(future::block_on(closed), Some(5));
    }

    #[test]
    fn test_dropped_notifier_resolves_none() {
        let (notifier, closed) = close_channel::<u32>();
        drop(notifier);
        assert_eq!(pollster::block_on(closed), None);
    }

    #[test]
    fn test_try_take() {
        let (notifier, mut closed) = close_channel::<&str>();
        assert_eq!(closed.try_take(), None);
        notifier.complete("confirmed");
        assert_eq!(closed.try_take(), Some("confirmed"));
        assert_eq!(closed.try_take(), None);
    }

    #[test]
    fn test_complete_after_receiver_dropped() {
        let (notifier, closed) = close_channel::<u32>();
        drop(closed);
        notifier.complete(1);
    }
}
