//! Prelude module for common imports.
//!
//! ```
//! use tola_listdiff::prelude::*;
//! ```

// Identity
pub use crate::core::{Diffable, Section};
pub use crate::id::StableId;

// Algorithms
pub use crate::algo::{
    diff, diff_sections, diff_sections_with_config, diff_with_config, Change, ChangeKind,
    DiffConfig, DiffResult, DiffStats, Diagnostic, NestedChanges, SectionDiff,
};

// Translation
pub use crate::convert::{convert, convert_sections, IndexPath, ItemBuckets, Position, SectionPlan};

// Patching
pub use crate::patch::{apply_changes, apply_in_place};

// Reconcile
pub use crate::reconcile::{
    BatchPlan, Completion, IndexedSurface, LiveLayout, MutationSurface, Phase, PhaseStatus,
    ReconcileConfig, ReconcileError, ReconcileOutcome, ReconcileResult, Reconciler, SurfaceError,
    SurfaceResult,
};

#[cfg(feature = "async")]
pub use crate::reconcile::AsyncMutationSurface;

// Error
pub use crate::error::{ListDiffError, ListDiffResult};
