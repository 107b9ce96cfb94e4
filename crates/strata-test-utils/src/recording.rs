//! A panel that records its hooks.

use std::cell::RefCell;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::rc::Rc;

use strata_core::protected::HookResult;
use strata_input::InputPhase;
use strata_panel::{FocusPolicy, HeadlessView, Panel, PanelCx, PanelTemplate};

/// Shared, ordered log of hook invocations.
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Returns the entries and empties the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.borrow().iter().any(|e| e == entry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Initialize,
    Open,
    Close,
    Predelete,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Initialize => "initialize",
            Hook::Open => "open",
            Hook::Close => "close",
            Hook::Predelete => "predelete",
        }
    }
}

/// How a hook misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Error,
    Panic,
}

/// Panel that appends `"{label}.{hook}"` to a [`HookLog`] for every hook,
/// with the open and close arguments in Debug form.
pub struct RecordingPanel<O = (), C = ()> {
    pub label: String,
    pub log: HookLog,
    failures: Vec<(Hook, Failure)>,
    close_on_open: Option<C>,
    close_on_cancel: Option<C>,
    _marker: PhantomData<fn(O)>,
}

impl<O, C> RecordingPanel<O, C>
where
    O: Debug + 'static,
    C: Debug + Clone + 'static,
{
    pub fn new(label: impl Into<String>, log: &HookLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
            failures: Vec::new(),
            close_on_open: None,
            close_on_cancel: None,
            _marker: PhantomData,
        }
    }

    /// Makes `hook` fail after logging.
    pub fn failing(mut self, hook: Hook, failure: Failure) -> Self {
        self.failures.push((hook, failure));
        self
    }

    /// Requests a close with `arg` from the next `on_open`.
    pub fn closing_on_open(mut self, arg: C) -> Self {
        self.close_on_open = Some(arg);
        self
    }

    /// Registers a cancel binding in `on_initialize` that closes with `arg`.
    pub fn closing_on_cancel(mut self, arg: C) -> Self {
        self.close_on_cancel = Some(arg);
        self
    }

    /// View with two focusable children (`"first"`, `"second"`) and a
    /// mouse-only `"backdrop"`.
    pub fn view() -> HeadlessView {
        HeadlessView::new()
            .with_child("first", FocusPolicy::Focusable)
            .with_child("second", FocusPolicy::Focusable)
            .with_mouse_only_child("backdrop")
    }

    pub fn template(label: &str, log: &HookLog) -> PanelTemplate {
        Self::template_with(label, log, |panel| panel)
    }

    /// Template whose instances are adjusted by `configure`.
    pub fn template_with(
        label: &str,
        log: &HookLog,
        configure: impl Fn(Self) -> Self + 'static,
    ) -> PanelTemplate {
        let label = label.to_owned();
        let log = log.clone();
        PanelTemplate::from_fn(label.clone(), move || {
            (configure(Self::new(label.clone(), &log)), Self::view())
        })
    }

    fn record(&self, hook: Hook, detail: Option<String>) -> HookResult {
        match detail {
            Some(detail) => self.log.push(format!("{}.{}({})", self.label, hook.as_str(), detail)),
            None => self.log.push(format!("{}.{}", self.label, hook.as_str())),
        }
        match self.failures.iter().find(|(h, _)| *h == hook) {
            Some((_, Failure::Error)) => {
                Err(format!("{} refused to {}", self.label, hook.as_str()).into())
            }
            Some((_, Failure::Panic)) => panic!("{} panicked in {}", self.label, hook.as_str()),
            None => Ok(()),
        }
    }
}

impl<O, C> Panel for RecordingPanel<O, C>
where
    O: Debug + 'static,
    C: Debug + Clone + 'static,
{
    type OpenArg = O;
    type CloseArg = C;

    fn on_initialize(&mut self, cx: &mut PanelCx<'_, Self>) -> HookResult {
        if let Some(arg) = self.close_on_cancel.clone() {
            cx.register_cancel(InputPhase::Pressed, move |commands| {
                commands.close(arg.clone());
            });
        }
        self.record(Hook::Initialize, None)
    }

    fn on_open(&mut self, cx: &mut PanelCx<'_, Self>, arg: &O) -> HookResult {
        if let Some(close) = self.close_on_open.take() {
            cx.close(close);
        }
        self.record(Hook::Open, Some(format!("{arg:?}")))
    }

    fn on_close(&mut self, _cx: &mut PanelCx<'_, Self>, arg: &C) -> HookResult {
        self.record(Hook::Close, Some(format!("{arg:?}")))
    }

    fn on_predelete(&mut self, _cx: &mut PanelCx<'_, Self>) -> HookResult {
        self.record(Hook::Predelete, None)
    }
}
