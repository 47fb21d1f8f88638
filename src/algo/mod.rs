//! Algorithm implementations.
//!
//! - `change`: edit-script records
//! - `heckel`: symbol-table matching and move detection
//! - `diff`: flat sequence diff with config, stats and diagnostics
//! - `section`: section-aware diff with nested item diffs

mod change;
mod diff;
mod heckel;
mod section;

pub use change::{Change, ChangeKind, DeleteRef, InsertRef, MoveRef, ReplaceRef};
pub use diff::{diff, diff_with_config, DiffConfig, DiffResult, DiffStats, Diagnostic, Side};
pub use section::{diff_sections, diff_sections_with_config, NestedChanges, SectionDiff};

#[cfg(feature = "parallel")]
pub use section::diff_sections_par;
