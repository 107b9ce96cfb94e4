//! Identifiers for panels, templates, containers and child widgets.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use strata_core::alloc::IndexSlot;

/// Untyped identity of a live panel instance.
///
/// Stays stable while the instance is cached and reused; becomes stale once
/// the instance is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(pub(crate) IndexSlot);

impl PanelId {
    pub fn slot(&self) -> IndexSlot {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Panel#{}v{}", self.0.index(), self.0.generation())
    }
}

/// Typed handle to a panel of type `P`.
///
/// Returned by [`PanelRuntime::create_panel`](crate::PanelRuntime::create_panel)
/// and used for the typed open/close/query operations.
pub struct PanelHandle<P> {
    id: PanelId,
    _marker: PhantomData<fn() -> P>,
}

impl<P> PanelHandle<P> {
    pub(crate) fn new(id: PanelId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }
}

impl<P> Clone for PanelHandle<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PanelHandle<P> {}

impl<P> PartialEq for PanelHandle<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for PanelHandle<P> {}

impl<P> std::hash::Hash for PanelHandle<P> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<P> fmt::Debug for PanelHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanelHandle")
            .field(&std::any::type_name::<P>())
            .field(&self.id)
            .finish()
    }
}

impl<P> From<PanelHandle<P>> for PanelId {
    fn from(handle: PanelHandle<P>) -> Self {
        handle.id
    }
}

static TEMPLATE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`PanelTemplate`](crate::PanelTemplate); the buffer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateId(u64);

impl TemplateId {
    pub(crate) fn next() -> Self {
        Self(TEMPLATE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node in the presentation tree that panels are parented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub(crate) u32);

impl ContainerId {
    /// The default root every runtime starts with.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container#{}", self.0)
    }
}

static OWNER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Who pushed an entry onto the container stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerId {
    Panel(PanelId),
    Token(u64),
}

impl OwnerId {
    /// Generate a new unique owner token for non-panel owners.
    pub fn new() -> Self {
        OwnerId::Token(OWNER_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<PanelId> for OwnerId {
    fn from(id: PanelId) -> Self {
        OwnerId::Panel(id)
    }
}

impl<P> From<PanelHandle<P>> for OwnerId {
    fn from(handle: PanelHandle<P>) -> Self {
        OwnerId::Panel(handle.id())
    }
}

/// Identifier of an interactive child widget inside a panel view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId(u64);

impl ChildId {
    /// Create a child ID from a string key.
    ///
    /// Uses FNV-1a hash for fast, consistent hashing.
    pub fn new(key: &str) -> Self {
        const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
        const FNV_PRIME: u64 = 0x100000001b3;

        let mut hash = FNV_OFFSET_BASIS;
        for byte in key.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self(hash)
    }

    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<&str> for ChildId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChildId(0x{:016x})", self.0)
    }
}
