//! Error types for panel operations.
//!
//! These are structural violations (broken templates, out-of-order closes,
//! unbalanced container pops). Failures inside user hooks are not errors of
//! the operation; they are published through the runtime's exception channel.

use std::fmt;

use crate::id::{ContainerId, OwnerId, PanelId};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    /// The template produced nothing, or a panel of another type.
    InvalidTemplate {
        template: String,
        /// Type name the caller asked for.
        expected: &'static str,
        reason: &'static str,
    },

    /// The panel was never initialized.
    Uninitialized { panel: PanelId },

    /// Open was called on a panel that is already opened.
    AlreadyOpened { panel: PanelId },

    /// Close was called on a panel that is not the top of the stack.
    ClosingOrder {
        panel: PanelId,
        top: Option<PanelId>,
    },

    /// A container pop was requested by someone other than its owner.
    UnauthorizedOwner {
        requester: OwnerId,
        owner: Option<OwnerId>,
        container: ContainerId,
    },

    /// The handle refers to a destroyed panel.
    StalePanel { panel: PanelId },

    /// An open or close argument had the wrong type for the panel.
    ArgumentType {
        panel: PanelId,
        expected: &'static str,
    },

    /// The panel was closed under the delete policy and is being torn down.
    PendingDeletion { panel: PanelId },

    /// The operation requires a panel that is not opened.
    StillOpen { panel: PanelId },

    /// A container id that this runtime never created.
    UnknownContainer { container: ContainerId },
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::InvalidTemplate {
                template,
                expected,
                reason,
            } => write!(
                f,
                "Unable to create '{}' as {}: {}",
                template, expected, reason
            ),
            PanelError::Uninitialized { panel } => {
                write!(f, "{} is not initialized", panel)
            }
            PanelError::AlreadyOpened { panel } => {
                write!(f, "{} is already opened", panel)
            }
            PanelError::ClosingOrder { panel, top } => match top {
                Some(top) => write!(
                    f,
                    "Closing order mismatch: {} is not the top panel ({} is)",
                    panel, top
                ),
                None => write!(f, "Closing order mismatch: {} with an empty stack", panel),
            },
            PanelError::UnauthorizedOwner {
                requester,
                owner,
                container,
            } => write!(
                f,
                "{:?} may not pop {} owned by {:?}",
                requester, container, owner
            ),
            PanelError::StalePanel { panel } => {
                write!(f, "{} no longer exists", panel)
            }
            PanelError::ArgumentType { panel, expected } => {
                write!(f, "{} expects an argument of type {}", panel, expected)
            }
            PanelError::PendingDeletion { panel } => {
                write!(f, "{} is pending deletion", panel)
            }
            PanelError::StillOpen { panel } => {
                write!(f, "{} is still open", panel)
            }
            PanelError::UnknownContainer { container } => {
                write!(f, "{} does not exist", container)
            }
        }
    }
}

impl std::error::Error for PanelError {}

/// Result type for panel operations.
pub type PanelResult<T> = Result<T, PanelError>;
