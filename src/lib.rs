//! tola-listdiff - Identity-based list diffing for batched UI updates
//!
//! ## Core Concepts
//!
//! **Identity vs content**: elements carry a stable identity key and a
//! content-equality check ([`Diffable`]). Same identity with different content
//! is an edit (`Replace`); a different relative order is a `Move`.
//!
//! **Two-phase reconcile**: edits are reloaded at their old positions in one
//! transaction; the data update, deletes, inserts and moves follow in another.
//! The two commits are joined into a single completion signal.
//!
//! ## Modules
//! - `core`: the `Diffable` contract and `Section`
//! - `id`: content-derived `StableId` keys
//! - `algo`: symbol-table diff, section diff, move detection
//! - `convert`: edit script to `IndexPath` buckets
//! - `patch`: applying an edit script to owned data
//! - `reconcile`: `MutationSurface`, `Reconciler`, `Completion`
//!
//! ## Usage
//!
//! ```
//! use tola_listdiff::{convert, diff, Change, IndexedSurface, Reconciler};
//!
//! let old = vec!['a', 'b', 'c'];
//! let new = vec!['a', 'c', 'b'];
//!
//! let changes = diff(&old, &new);
//! assert_eq!(changes, vec![Change::Move { from: 2, to: 1, item: 'c' }]);
//!
//! let mut surface = IndexedSurface::with_counts([old.len()]);
//! let mut live = old.clone();
//! let completion = Reconciler::default()
//!     .apply(&mut surface, &convert(&changes, 0), || live = new.clone())
//!     .unwrap();
//! assert!(completion.wait().succeeded());
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Identity contract and sections
pub mod core;

/// Stable identity keys
pub mod id;

/// Algorithms: heckel diff, section diff
pub mod algo;

/// Position translation
pub mod convert;

/// Applying edit scripts to owned data
pub mod patch;

/// Mutation surfaces and the two-phase reconciler
pub mod reconcile;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

// =============================================================================
// Re-exports
// =============================================================================

// Identity
pub use crate::core::{Diffable, Section};
pub use id::StableId;

// Algorithms
pub use algo::{
    diff, diff_sections, diff_sections_with_config, diff_with_config, Change, ChangeKind,
    DiffConfig, DiffResult, DiffStats, Diagnostic, NestedChanges, SectionDiff, Side,
};

#[cfg(feature = "parallel")]
pub use algo::diff_sections_par;

// Translation
pub use convert::{
    convert, convert_section_changes, convert_sections, ChangeBuckets, IndexPath, ItemBuckets,
    NestedBuckets, Position, SectionBuckets, SectionPlan,
};

// Reconcile
pub use reconcile::{
    BatchPlan, Completion, IndexedSurface, LiveLayout, MutationSurface, Phase, PhaseStatus,
    ReconcileConfig, ReconcileError, ReconcileOutcome, ReconcileResult, Reconciler, SurfaceError,
};

#[cfg(feature = "async")]
pub use reconcile::AsyncMutationSurface;

// Error types
pub use error::{ListDiffError, ListDiffResult};

// =============================================================================
// Tests
// =============================================================================
