//! Strata - panel lifecycle and input-focus orchestration
//!
//! Strata manages the stack of UI panels a game shows: menus, dialogs,
//! popups. It provides:
//!
//! - **Panel Stack**: LIFO opening and closing, with only the top panel
//!   receiving input and focus restored when a panel closes
//! - **Lifecycle Hooks**: initialize, open, close and predelete, protected
//!   against errors and panics
//! - **Instance Reuse**: closed panels can be cached per template
//! - **Input Routing**: action maps, cancel handling, axis and vector
//!   gestures
//! - **Transitions**: pluggable show/hide tweeners
//!
//! # Quick Start
//!
//! ```ignore
//! use strata::prelude::*;
//!
//! struct Pause;
//!
//! impl Panel for Pause {
//!     type OpenArg = ();
//!     type CloseArg = bool;
//!
//!     fn on_open(&mut self, cx: &mut PanelCx<'_, Self>, _: &()) -> HookResult {
//!         cx.register_input(actions::UI_ACCEPT, InputPhase::Pressed, |commands, _| {
//!             commands.close(true);
//!         });
//!         Ok(())
//!     }
//! }
//!
//! let template = PanelTemplate::from_fn("pause", || (Pause, HeadlessView::new()));
//! let mut runtime = PanelRuntime::new();
//! let pause = runtime.create_panel::<Pause>(&template, CreatePolicy::TryReuse, |_| {})?;
//! runtime.open_panel_with(pause, (), OpenOptions::new(), |_, resume| {
//!     tracing::info!(resume, "pause menu closed");
//! })?;
//! ```

pub use strata_core as core;
pub use strata_core::{logging, math, profiling};
pub use strata_input as input;
pub use strata_panel as panel;

pub use strata_panel::{
    ClosePolicy, CreatePolicy, OpenOptions, Panel, PanelCx, PanelError, PanelHandle, PanelId,
    PanelResult, PanelRuntime, PanelTemplate, PreviousVisual, RuntimeConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use strata_core::math::Vec2;
    pub use strata_core::protected::{HookResult, ProtectedFailure};

    pub use strata_input::{
        CompositeState, HandleStatus, InputBatch, InputBinding, InputEvent, InputMap, InputPhase,
        actions,
    };

    pub use strata_panel::{
        ChildId, ClosePolicy, ContainerId, CreatePolicy, Easing, FadeTweener, FocusPolicy,
        HeadlessView, NoneTweener, OpenOptions, OwnerId, Panel, PanelClosed, PanelCommands,
        PanelCx, PanelError, PanelHandle, PanelId, PanelInstance, PanelResult, PanelRuntime,
        PanelSignal, PanelStatus, PanelTemplate, PanelTweener, PanelView, PreviousVisual,
        RuntimeConfig,
    };
}
