//! Protected execution of user hooks.
//!
//! Panel hooks and input callbacks are user code. A failure in one of them
//! must not abort the runtime operation that invoked it, so every call goes
//! through [`ExceptionPublisher::run`], which catches both returned errors and
//! panics, reports them, and carries on.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

/// Error type returned by fallible hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by fallible hooks.
pub type HookResult<T = ()> = Result<T, HookError>;

/// Why a protected call failed.
#[derive(Debug)]
pub enum FailureCause {
    /// The hook returned an error.
    Error(HookError),
    /// The hook panicked; holds the panic message when it was a string.
    Panic(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(err) => write!(f, "{err}"),
            FailureCause::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// A failure captured while running user code.
#[derive(Debug)]
pub struct ProtectedFailure<'a> {
    /// What the runtime was doing, e.g. `"Panel Open"`.
    pub action: &'a str,
    /// The object the hook belongs to, usually a panel name.
    pub target: &'a str,
    /// The hook or callback that failed.
    pub method: &'a str,
    pub cause: FailureCause,
}

impl fmt::Display for ProtectedFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed in {}::{}: {}",
            self.action, self.target, self.method, self.cause
        )
    }
}

type FailureHandler = Rc<dyn Fn(&ProtectedFailure<'_>)>;

/// Publishes hook failures to a pluggable handler.
///
/// Without a handler, failures are logged with `tracing::error!`.
#[derive(Clone, Default)]
pub struct ExceptionPublisher {
    handler: Option<FailureHandler>,
}

impl ExceptionPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(handler: impl Fn(&ProtectedFailure<'_>) + 'static) -> Self {
        Self {
            handler: Some(Rc::new(handler)),
        }
    }

    /// Replaces the failure handler.
    pub fn set_handler(&mut self, handler: impl Fn(&ProtectedFailure<'_>) + 'static) {
        self.handler = Some(Rc::new(handler));
    }

    /// Restores the default logging handler.
    pub fn clear_handler(&mut self) {
        self.handler = None;
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    pub fn publish(&self, failure: &ProtectedFailure<'_>) {
        match &self.handler {
            Some(handler) => handler(failure),
            None => tracing::error!(
                action = failure.action,
                object = failure.target,
                method = failure.method,
                "protected call failed: {}",
                failure.cause
            ),
        }
    }

    /// Runs a fallible hook, publishing any error or panic.
    ///
    /// Returns `None` if the hook failed.
    pub fn run<R>(
        &self,
        action: &str,
        target: &str,
        method: &str,
        f: impl FnOnce() -> HookResult<R>,
    ) -> Option<R> {
        let cause = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(err)) => FailureCause::Error(err),
            Err(payload) => FailureCause::Panic(panic_message(payload.as_ref())),
        };
        self.publish(&ProtectedFailure {
            action,
            target,
            method,
            cause,
        });
        None
    }

    /// Runs an infallible callback, publishing a panic if one occurs.
    ///
    /// Returns `false` if the callback panicked.
    pub fn run_callback(&self, action: &str, target: &str, method: &str, f: impl FnOnce()) -> bool {
        self.run(action, target, method, || {
            f();
            Ok(())
        })
        .is_some()
    }
}

impl fmt::Debug for ExceptionPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionPublisher")
            .field("custom_handler", &self.handler.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording() -> (ExceptionPublisher, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let publisher = ExceptionPublisher::with_handler(move |failure| {
            sink.borrow_mut().push(failure.to_string());
        });
        (publisher, log)
    }

    #[test]
    fn test_run_passes_value_through() {
        let (publisher, log) = recording();
        assert_eq!(publisher.run("Panel Open", "Menu", "on_open", || Ok(7)), Some(7));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_run_publishes_error() {
        let (publisher, log) = recording();
        let result: Option<()> =
            publisher.run("Panel Open", "Menu", "on_open", || Err("boom".into()));
        assert!(result.is_none());
        assert_eq!(log.borrow().as_slice(), ["Panel Open failed in Menu::on_open: boom"]);
    }

    #[test]
    fn test_run_catches_panic() {
        let (publisher, log) = recording();
        let ran = publisher.run_callback("Input Call", "Menu", "pressed", || panic!("bad input"));
        assert!(!ran);
        assert!(log.borrow()[0].ends_with("panicked: bad input"));
    }

    #[test]
    fn test_clear_handler_restores_default() {
        let (mut publisher, log) = recording();
        publisher.clear_handler();
        assert!(!publisher.has_handler());
        let _: Option<()> = publisher.run("Panel Close", "Menu", "on_close", || Err("x".into()));
        assert!(log.borrow().is_empty());
    }
}
