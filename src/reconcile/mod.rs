//! Applying translated edit scripts to a mutation surface.
//!
//! The reconciler drives a [`MutationSurface`] through two transactions:
//! a reload of edited elements at their old positions, then the data update
//! followed by structural changes. Both report back through a single
//! [`Completion`].
//!
//! # Example
//!
//! ```
//! use tola_listdiff::{diff_sections, reconcile, IndexedSurface, LiveLayout, Section};
//!
//! let old = vec![Section::new("inbox", vec![1, 2]), Section::new("done", vec![3])];
//! let new = vec![Section::new("inbox", vec![2]), Section::new("done", vec![1, 3])];
//!
//! let layout = LiveLayout::of_sections(&old);
//! let mut surface = IndexedSurface::with_layout(layout.clone());
//! let result = diff_sections(&old, &new);
//!
//! let completion = reconcile::reload_sections(&mut surface, &result, || {
//!     layout.set_sections(&new);
//! })
//! .unwrap();
//! assert!(completion.wait().succeeded());
//! assert_eq!(surface.counts(), &[1, 2]);
//! ```

mod batch;
mod error;
mod indexed;
mod latch;
mod reconciler;
mod surface;

pub use batch::BatchPlan;
pub use error::{
    MutationKind, Phase, PhaseStatus, ReconcileError, ReconcileResult, SurfaceError, SurfaceResult,
};
pub use indexed::{IndexedSurface, LiveLayout, Mutation};
pub use latch::{Completion, ReconcileOutcome};
pub use reconciler::{ReconcileConfig, Reconciler};
pub use surface::{CommitCallback, MutationSurface};

#[cfg(feature = "async")]
pub use surface::AsyncMutationSurface;

use crate::algo::{Change, SectionDiff};
use crate::convert::{convert, convert_sections};
use crate::core::Diffable;

/// Apply a flat edit script to the items of `section`.
pub fn reload<S, T, F>(
    surface: &mut S,
    changes: &[Change<T>],
    section: usize,
    update_data: F,
) -> ReconcileResult<Completion>
where
    S: MutationSurface + ?Sized,
    F: FnOnce(),
{
    Reconciler::default().apply(surface, &convert(changes, section), update_data)
}

/// Apply a section diff, nested item changes included.
///
/// A diff with `should_reload` set carries no changes. It fails with
/// [`ReconcileError::ReloadRequired`] before any surface call, and
/// `update_data` is not run.
pub fn reload_sections<S, K, I, F>(
    surface: &mut S,
    diff: &SectionDiff<K, I>,
    update_data: F,
) -> ReconcileResult<Completion>
where
    S: MutationSurface + ?Sized,
    I: Diffable,
    F: FnOnce(),
{
    if diff.should_reload {
        tracing::warn!(
            edits = diff.stats.edit_count(),
            "section diff exceeded its change limit, full reload required"
        );
        return Err(ReconcileError::ReloadRequired);
    }
    Reconciler::default().apply(surface, &convert_sections(diff), update_data)
}
