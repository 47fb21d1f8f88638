//! Reconciliation error types.

use std::fmt;

use thiserror::Error;

use crate::convert::Position;

/// The two units of work of a reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Content reload at pre-mutation positions, isolated from structure.
    Reload,
    /// Data update followed by deletes, inserts and moves.
    Rearrange,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reload => "reload",
            Self::Rearrange => "rearrange",
        })
    }
}

/// Mutation operations of a [`MutationSurface`](super::MutationSurface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    InsertItems,
    DeleteItems,
    MoveItem,
    ReloadItems,
    InsertSections,
    DeleteSections,
    MoveSection,
    ReloadSections,
}

impl MutationKind {
    /// Whether this operation changes the layout (as opposed to reloading content).
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::ReloadItems | Self::ReloadSections)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InsertItems => "insert_items",
            Self::DeleteItems => "delete_items",
            Self::MoveItem => "move_item",
            Self::ReloadItems => "reload_items",
            Self::InsertSections => "insert_sections",
            Self::DeleteSections => "delete_sections",
            Self::MoveSection => "move_section",
            Self::ReloadSections => "reload_sections",
        })
    }
}

/// Error reported by a mutation surface for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Position outside the surface's bounds at call time.
    #[error("{op} at {position} out of bounds (bound {bound})")]
    OutOfBounds {
        op: MutationKind,
        position: Position,
        bound: usize,
    },

    /// Mutation issued outside a transaction.
    #[error("{op} called outside a transaction")]
    NoTransaction { op: MutationKind },

    /// Surface refused the mutation.
    #[error("surface rejected mutation: {0}")]
    Rejected(String),
}

/// Result type alias for surface calls.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// How one phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    /// All calls accepted and the surface reported a successful commit.
    Succeeded,
    /// Calls accepted but the surface reported a failed commit.
    Rejected,
    /// A mutation call failed; remaining calls of the phase were not issued.
    Errored(SurfaceError),
}

impl PhaseStatus {
    /// Combine the result of issuing a phase with the surface's commit report.
    pub fn from_commit(issued: SurfaceResult<()>, committed: bool) -> Self {
        match issued {
            Err(err) => Self::Errored(err),
            Ok(()) if committed => Self::Succeeded,
            Ok(()) => Self::Rejected,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Rejected => f.write_str("rejected by surface"),
            Self::Errored(err) => write!(f, "errored: {err}"),
        }
    }
}

/// Errors that can occur during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Pre-flight check found a position beyond the live structure's bounds.
    /// No mutation call was issued.
    #[error("{phase} phase: {op} at {position} out of range (bound {bound})")]
    OutOfRange {
        phase: Phase,
        op: MutationKind,
        position: Position,
        bound: usize,
    },

    /// The diff exceeded its change limit and carries no changes. Nothing
    /// was issued and the data was not updated; reload the whole surface.
    #[error("diff exceeded its change limit, full reload required")]
    ReloadRequired,

    /// At least one phase failed.
    #[error("reconcile failed (reload {reload}, rearrange {rearrange})")]
    Transaction {
        reload: PhaseStatus,
        rearrange: PhaseStatus,
    },
}

/// Result type alias for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
