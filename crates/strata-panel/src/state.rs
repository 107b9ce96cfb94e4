//! Widget-agnostic panel state and opening options.

use std::rc::Rc;

use strata_input::{BindingId, InputRouter};

use crate::id::{ChildId, TemplateId};
use crate::panel::PanelCommands;
use crate::signal::SignalSource;
use crate::tween::PanelTweener;

/// Lifecycle status of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelStatus {
    Uninitialized,
    Initialized,
    Opened,
    Closed,
}

/// Whether `create_panel` may hand out a cached instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    /// Always instantiate the template.
    ForceNew,
    /// Pop a buffered instance of the same template if one exists.
    #[default]
    TryReuse,
}

/// What happens to the panel underneath when a panel opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviousVisual {
    #[default]
    Visible,
    Hidden,
}

/// What happens to a panel after it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// Destroy once the hide transition finishes.
    Delete,
    /// Park in the instance buffer for reuse.
    #[default]
    Cache,
}

/// Options recorded when a panel opens and consulted when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    pub previous_visual: PreviousVisual,
    pub close_policy: ClosePolicy,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide_previous(mut self) -> Self {
        self.previous_visual = PreviousVisual::Hidden;
        self
    }

    pub fn delete_on_close(mut self) -> Self {
        self.close_policy = ClosePolicy::Delete;
        self
    }

    pub fn with_previous_visual(mut self, previous_visual: PreviousVisual) -> Self {
        self.previous_visual = previous_visual;
        self
    }

    pub fn with_close_policy(mut self, close_policy: ClosePolicy) -> Self {
        self.close_policy = close_policy;
        self
    }
}

/// Input routing for one panel; callbacks receive the panel's command buffer.
pub type PanelInput = InputRouter<PanelCommands>;

pub(crate) struct PanelState {
    pub name: String,
    pub status: PanelStatus,
    pub template: Option<TemplateId>,
    pub close_requested: SignalSource,
    pub open_transition: SignalSource,
    pub close_transition: SignalSource,
    pub input: PanelInput,
    pub cached_focus: Option<ChildId>,
    pub tweener: Option<Rc<dyn PanelTweener>>,
    /// Tweener that started the last show or hide. It keeps advancing that
    /// transition even if the panel's tweener changes meanwhile.
    pub transition_tweener: Option<Rc<dyn PanelTweener>>,
    /// Whether the last visibility request was a show.
    pub shown: bool,
    pub options: Option<OpenOptions>,
    pub pending_delete: bool,
    pub cancel_binding: Option<BindingId>,
}

impl PanelState {
    pub fn new(name: String) -> Self {
        Self {
            name,
            status: PanelStatus::Uninitialized,
            template: None,
            close_requested: SignalSource::new(),
            open_transition: SignalSource::new(),
            close_transition: SignalSource::new(),
            input: PanelInput::new(),
            cached_focus: None,
            tweener: None,
            transition_tweener: None,
            shown: true,
            options: None,
            pending_delete: false,
            cancel_binding: None,
        }
    }

    /// Disposes signals and drops per-open state. Input bookkeeping is
    /// cleared separately because it needs the pool.
    pub fn dispose(&mut self) {
        self.close_requested.dispose();
        self.open_transition.dispose();
        self.close_transition.dispose();
        self.cached_focus = None;
        self.tweener = None;
        self.transition_tweener = None;
        self.options = None;
        self.cancel_binding = None;
    }
}
