//! The mutation surface a reconcile drives.
//!
//! A surface is whatever renders the ordered structure: a list view, a table,
//! a terminal pane. It batches mutations between `begin_transaction` and
//! `commit_transaction` and reports through the commit callback whether the
//! batch was applied.

use crate::convert::IndexPath;

use super::error::{Phase, SurfaceResult};

/// Callback receiving the commit result of one transaction.
pub type CommitCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Batched mutation target.
///
/// Bounds are the surface's own: deletes, reloads and move sources are
/// checked against the pre-mutation layout, inserts and move destinations
/// against the expected post-mutation layout. Out-of-bounds calls fail with
/// [`SurfaceError::OutOfBounds`](super::SurfaceError::OutOfBounds).
pub trait MutationSurface {
    /// Number of sections in the current (pre-mutation) layout.
    fn section_count(&self) -> usize;

    /// Number of items in `section` in the current layout, 0 if absent.
    fn item_count(&self, section: usize) -> usize;

    /// Open a transaction. A [`Phase::Reload`] transaction only carries
    /// reloads and may be applied without animation.
    fn begin_transaction(&mut self, phase: Phase);

    /// Close the open transaction. `on_complete` may run synchronously or
    /// later, on any thread.
    fn commit_transaction(&mut self, on_complete: CommitCallback);

    fn insert_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()>;
    fn delete_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()>;
    fn move_item(&mut self, from: IndexPath, to: IndexPath) -> SurfaceResult<()>;
    fn reload_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()>;

    fn insert_sections(&mut self, indices: &[usize]) -> SurfaceResult<()>;
    fn delete_sections(&mut self, indices: &[usize]) -> SurfaceResult<()>;
    fn move_section(&mut self, from: usize, to: usize) -> SurfaceResult<()>;
    fn reload_sections(&mut self, indices: &[usize]) -> SurfaceResult<()>;
}

/// Surface whose commits can be awaited.
///
/// The returned future must not borrow the surface, so both phase futures
/// can be alive at once and joined.
#[cfg(feature = "async")]
pub trait AsyncMutationSurface: MutationSurface {
    /// Close the open transaction, resolving to its success flag.
    fn commit_async(&mut self) -> impl std::future::Future<Output = bool> + Send + 'static;
}
