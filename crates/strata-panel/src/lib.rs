//! Panel lifecycle and input-focus orchestration.
//!
//! A [`PanelRuntime`] owns every panel created from a [`PanelTemplate`] and
//! keeps the opened ones on a LIFO stack. Only the top panel receives input;
//! opening a panel suspends the one beneath (its held inputs are released and
//! its focused child remembered) and closing it restores that panel.
//!
//! # Overview
//!
//! - [`Panel`] - user hooks for initialize, open, close and predelete
//! - [`PanelCx`] - what a hook can touch: view, input registration, commands
//! - [`PanelView`] - the widget-facing side of a panel ([`HeadlessView`] for tests)
//! - [`PanelTweener`] - show/hide transitions ([`NoneTweener`], [`FadeTweener`])
//! - [`PanelSignal`] / [`PanelClosed`] - single-shot events and the close future
//!
//! # Example
//!
//! ```ignore
//! let mut runtime = PanelRuntime::new();
//! let confirm =
//!     runtime.create_panel::<Confirm>(&confirm_template, CreatePolicy::TryReuse, |_| {})?;
//! let answer = runtime.open_panel_async(confirm, "Quit?".into(), OpenOptions::new())?;
//! // ... feed input and call `update` each frame ...
//! ```

pub mod awaitable;
pub mod config;
pub mod error;
pub mod id;
pub mod panel;
pub mod runtime;
pub mod signal;
pub mod state;
pub mod template;
pub mod tree;
pub mod tween;
pub mod view;

pub use awaitable::PanelClosed;
pub use config::RuntimeConfig;
pub use error::{PanelError, PanelResult};
pub use id::{ChildId, ContainerId, OwnerId, PanelHandle, PanelId, TemplateId};
pub use panel::{Deferred, Panel, PanelCommands, PanelCx};
pub use runtime::PanelRuntime;
pub use signal::{PanelSignal, SignalWait};
pub use state::{ClosePolicy, CreatePolicy, OpenOptions, PanelInput, PanelStatus, PreviousVisual};
pub use template::{PanelInstance, PanelTemplate};
pub use tree::PanelTree;
pub use tween::{Easing, FadeTweener, NoneTweener, PanelTweener, TweenFinish};
pub use view::{ChildGate, FocusPolicy, HeadlessView, InteractiveChild, MouseFilter, PanelView};
