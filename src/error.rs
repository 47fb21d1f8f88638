//! Error types for tola-listdiff.
//!
//! Diff computation itself cannot fail. These errors come from applying an
//! edit script to owned data (see [`crate::patch`]). Reconciliation against a
//! mutation surface has its own error type in [`crate::reconcile`].

use thiserror::Error;

/// Errors that can occur while applying an edit script to a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListDiffError {
    /// A change refers to a position outside the sequence it addresses.
    #[error("{op} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        /// Change kind that carried the index (`delete`, `insert`, ...)
        op: &'static str,
        /// Offending index
        index: usize,
        /// Exclusive bound at the time the change is applied
        bound: usize,
    },

    /// Two changes target the same slot of the result.
    #[error("{op} targets slot {index} which is already filled")]
    SlotConflict {
        /// Change kind that hit the conflict
        op: &'static str,
        /// Slot index in the new sequence
        index: usize,
    },

    /// The script does not describe a complete transformation.
    #[error("edit script incomplete: {expected} slots expected, {found} filled")]
    IncompleteScript {
        /// Length of the resulting sequence
        expected: usize,
        /// Number of slots the script and the survivors filled
        found: usize,
    },
}

/// Result type alias for edit-script application.
pub type ListDiffResult<T> = Result<T, ListDiffError>;

impl ListDiffError {
    /// Create an out-of-range error.
    pub fn out_of_range(op: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { op, index, bound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ListDiffError::out_of_range("delete", 5, 3);
        assert_eq!(err.to_string(), "delete index 5 out of range (bound 3)");

        let err = ListDiffError::IncompleteScript { expected: 4, found: 3 };
        assert_eq!(err.to_string(), "edit script incomplete: 4 slots expected, 3 filled");
    }

    #[test]
    fn test_error_is_send_sync() {
        static_assertions::assert_impl_all!(ListDiffError: Send, Sync);
    }
}
