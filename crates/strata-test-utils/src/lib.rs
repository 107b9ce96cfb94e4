//! Test utilities for Strata.
//!
//! - [`ManualTweener`] - a tweener whose transitions finish only when the
//!   test says so
//! - [`RecordingPanel`] and [`HookLog`] - a configurable panel that records
//!   every hook it runs
//! - [`input`] - shorthands for building input events
//!
//! # Example
//!
//! ```rust
//! use strata_panel::{CreatePolicy, OpenOptions, PanelRuntime};
//! use strata_test_utils::{HookLog, RecordingPanel};
//!
//! let log = HookLog::new();
//! let template = RecordingPanel::<u32, bool>::template("menu", &log);
//!
//! let mut runtime = PanelRuntime::new();
//! let menu = runtime
//!     .create_panel::<RecordingPanel<u32, bool>>(&template, CreatePolicy::TryReuse, |_| {})
//!     .unwrap();
//! runtime.open_panel(menu, 7, OpenOptions::new()).unwrap();
//! runtime.close_panel(menu, true).unwrap();
//!
//! assert_eq!(log.entries(), ["menu.initialize", "menu.open(7)", "menu.close(true)"]);
//! ```

pub mod input;
pub mod recording;
pub mod tweener;

pub use recording::*;
pub use tweener::*;
