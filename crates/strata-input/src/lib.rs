//! Strata Input
//!
//! Turns raw press/release events into named actions and routes them to
//! per-action delegate chains. Composite bindings combine two or four actions
//! into an axis or vector gesture with start/update/end callbacks.

pub mod action_map;
pub mod batch;
pub mod cached;
pub mod composite;
pub mod event;
pub mod router;
#[cfg(feature = "winit")]
pub mod winit;

pub use action_map::{ActionMatcher, InputBinding, InputMap, actions};
pub use batch::InputBatch;
pub use cached::CachedInputEvent;
pub use composite::{
    AxisSide, AxisState, AxisTransition, CompositeState, VectorAxis, VectorState, VectorTransition,
};
pub use event::{AxisDirection, HandleStatus, InputEvent, InputKind, InputPhase, MouseButton};
pub use router::{BindingId, InputRouter};
