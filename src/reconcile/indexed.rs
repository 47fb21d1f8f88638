//! In-memory mutation surface.
//!
//! [`IndexedSurface`] tracks only the number of items per section, which is
//! all a surface needs to validate a batch. It enforces pre-mutation bounds
//! when a call is made and post-mutation bounds when the transaction commits,
//! and keeps a journal of every call. Headless consumers use it to mirror a
//! structure they render elsewhere; tests use it as the reference surface.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::convert::{IndexPath, Position};
use crate::core::Section;

use super::error::{MutationKind, Phase, SurfaceError, SurfaceResult};
use super::surface::{CommitCallback, MutationSurface};

// =============================================================================
// Live layout
// =============================================================================

/// Item counts per section, shared between a surface and the code that
/// updates the backing data.
///
/// The update closure given to the reconciler writes the new counts; the
/// surface compares them with what its mutations produce at commit.
#[derive(Debug, Clone, Default)]
pub struct LiveLayout(Arc<RwLock<Vec<usize>>>);

impl LiveLayout {
    pub fn new(counts: impl Into<Vec<usize>>) -> Self {
        Self(Arc::new(RwLock::new(counts.into())))
    }

    /// Layout of a sectioned structure.
    pub fn of_sections<K, I>(sections: &[Section<K, I>]) -> Self {
        Self::new(sections.iter().map(Section::len).collect::<Vec<_>>())
    }

    /// Replace the counts.
    pub fn set(&self, counts: impl Into<Vec<usize>>) {
        *self.0.write() = counts.into();
    }

    /// Replace the counts from a sectioned structure.
    pub fn set_sections<K, I>(&self, sections: &[Section<K, I>]) {
        self.set(sections.iter().map(Section::len).collect::<Vec<_>>());
    }

    pub fn counts(&self) -> Vec<usize> {
        self.0.read().clone()
    }
}

// =============================================================================
// Journal
// =============================================================================

/// One journaled surface call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Begin(Phase),
    InsertItems(Vec<IndexPath>),
    DeleteItems(Vec<IndexPath>),
    MoveItem { from: IndexPath, to: IndexPath },
    ReloadItems(Vec<IndexPath>),
    InsertSections(Vec<usize>),
    DeleteSections(Vec<usize>),
    MoveSection { from: usize, to: usize },
    ReloadSections(Vec<usize>),
    Commit { phase: Phase, success: bool },
}

struct Transaction {
    phase: Phase,
    ops: Vec<Mutation>,
}

#[derive(Clone, Copy)]
enum Origin {
    Old(usize),
    Inserted,
}

// =============================================================================
// Surface
// =============================================================================

/// Count-tracking [`MutationSurface`].
pub struct IndexedSurface {
    counts: Vec<usize>,
    source: Option<LiveLayout>,
    open: Option<Transaction>,
    journal: Vec<Mutation>,
    deferred: Option<Vec<(CommitCallback, bool)>>,
    last_failure: Option<String>,
}

impl IndexedSurface {
    /// Surface showing `counts` items per section, with no data source to
    /// compare against at commit.
    pub fn with_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
            source: None,
            open: None,
            journal: Vec::new(),
            deferred: None,
            last_failure: None,
        }
    }

    /// Surface mirroring `layout`. Every rearrange commit must leave the
    /// surface with exactly the counts `layout` reports at that time.
    pub fn with_layout(layout: LiveLayout) -> Self {
        let mut surface = Self::with_counts(layout.counts());
        surface.source = Some(layout);
        surface
    }

    /// Hold commit callbacks until [`flush`](Self::flush) instead of running
    /// them inside `commit_transaction`.
    pub fn deferred(mut self) -> Self {
        self.deferred = Some(Vec::new());
        self
    }

    /// Run held commit callbacks. Returns how many ran.
    pub fn flush(&mut self) -> usize {
        let Some(queue) = self.deferred.as_mut() else {
            return 0;
        };
        let pending = std::mem::take(queue);
        let count = pending.len();
        for (callback, success) in pending {
            callback(success);
        }
        count
    }

    /// Current item counts per section.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    /// Why the last failed commit failed.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn in_transaction(&self) -> bool {
        self.open.is_some()
    }

    // -------------------------------------------------------------------------
    // Call-time checks
    // -------------------------------------------------------------------------

    fn open_phase(&self, op: MutationKind) -> SurfaceResult<Phase> {
        let Some(tx) = &self.open else {
            return Err(SurfaceError::NoTransaction { op });
        };
        if tx.phase == Phase::Reload && op.is_structural() {
            return Err(SurfaceError::Rejected(format!("{op} inside a reload transaction")));
        }
        Ok(tx.phase)
    }

    fn check_section(&self, op: MutationKind, index: usize) -> SurfaceResult<()> {
        let bound = self.counts.len();
        if index < bound {
            Ok(())
        } else {
            Err(SurfaceError::OutOfBounds {
                op,
                position: Position::Section(index),
                bound,
            })
        }
    }

    fn check_item(&self, op: MutationKind, path: IndexPath) -> SurfaceResult<()> {
        self.check_section(op, path.section)?;
        let bound = self.counts[path.section];
        if path.item < bound {
            Ok(())
        } else {
            Err(SurfaceError::OutOfBounds {
                op,
                position: Position::Item(path),
                bound,
            })
        }
    }

    fn record(&mut self, entry: Mutation) {
        self.journal.push(entry.clone());
        if let Some(tx) = self.open.as_mut() {
            tx.ops.push(entry);
        }
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    fn commit(&mut self) -> bool {
        let Some(tx) = self.open.take() else {
            self.last_failure = Some("commit without an open transaction".into());
            tracing::warn!("commit without an open transaction");
            return false;
        };

        let result = match tx.phase {
            Phase::Reload => Ok(None),
            Phase::Rearrange => self.post_layout(&tx.ops).and_then(|counts| self.verify(counts)).map(Some),
        };
        let success = match result {
            Ok(Some(counts)) => {
                self.counts = counts;
                true
            }
            Ok(None) => true,
            Err(reason) => {
                tracing::warn!(phase = %tx.phase, %reason, "commit failed");
                self.last_failure = Some(reason);
                false
            }
        };
        self.journal.push(Mutation::Commit { phase: tx.phase, success });
        success
    }

    fn verify(&self, counts: Vec<usize>) -> Result<Vec<usize>, String> {
        match &self.source {
            Some(source) => {
                let expected = source.counts();
                if expected == counts {
                    Ok(counts)
                } else {
                    Err(format!(
                        "data reports {expected:?} items per section, mutations produce {counts:?}"
                    ))
                }
            }
            None => Ok(counts),
        }
    }

    /// Counts after applying `ops` with batch semantics.
    fn post_layout(&self, ops: &[Mutation]) -> Result<Vec<usize>, String> {
        let pre = &self.counts;

        let mut taken = vec![false; pre.len()];
        let mut take = |index: usize| -> Result<(), String> {
            match taken.get_mut(index) {
                Some(flag) if !*flag => {
                    *flag = true;
                    Ok(())
                }
                Some(_) => Err(format!("section {index} removed twice")),
                None => Err(format!("section {index} beyond bound {}", pre.len())),
            }
        };
        let mut placed: Vec<(usize, Origin)> = Vec::new();
        for op in ops {
            match op {
                Mutation::DeleteSections(indices) => {
                    for &index in indices {
                        take(index)?;
                    }
                }
                Mutation::InsertSections(indices) => {
                    placed.extend(indices.iter().map(|&index| (index, Origin::Inserted)));
                }
                Mutation::MoveSection { from, to } => {
                    take(*from)?;
                    placed.push((*to, Origin::Old(*from)));
                }
                _ => {}
            }
        }

        let removed = taken.iter().filter(|t| **t).count();
        let len = pre.len() - removed + placed.len();
        let mut slots: Vec<Option<Origin>> = vec![None; len];
        for (index, origin) in placed {
            let Some(slot) = slots.get_mut(index) else {
                return Err(format!("section {index} beyond post-update bound {len}"));
            };
            if slot.is_some() {
                return Err(format!("section {index} placed twice"));
            }
            *slot = Some(origin);
        }
        let mut survivors = (0..pre.len()).filter(|&old| !taken[old]);
        for slot in slots.iter_mut().filter(|s| s.is_none()) {
            *slot = survivors.next().map(Origin::Old);
        }

        // Inserted sections come with whatever the data reports for them.
        let reported = self.source.as_ref().map(LiveLayout::counts).unwrap_or_default();
        let mut old_to_new: Vec<Option<usize>> = vec![None; pre.len()];
        let mut counts = Vec::with_capacity(len);
        for (new, slot) in slots.iter().enumerate() {
            match slot {
                Some(Origin::Old(old)) => {
                    old_to_new[*old] = Some(new);
                    counts.push(pre[*old]);
                }
                Some(Origin::Inserted) | None => counts.push(reported.get(new).copied().unwrap_or(0)),
            }
        }

        let surviving = |path: &IndexPath| {
            old_to_new
                .get(path.section)
                .copied()
                .flatten()
                .ok_or_else(|| format!("item {path} is in a section removed by this transaction"))
        };
        let mut targets: Vec<(MutationKind, IndexPath)> = Vec::new();
        for op in ops {
            match op {
                Mutation::DeleteItems(paths) => {
                    for path in paths {
                        let section = surviving(path)?;
                        counts[section] = counts[section]
                            .checked_sub(1)
                            .ok_or_else(|| format!("too many deletes in section {}", path.section))?;
                    }
                }
                Mutation::MoveItem { from, to } => {
                    let section = surviving(from)?;
                    counts[section] = counts[section]
                        .checked_sub(1)
                        .ok_or_else(|| format!("too many removals in section {}", from.section))?;
                    targets.push((MutationKind::MoveItem, *to));
                }
                Mutation::InsertItems(paths) => {
                    targets.extend(paths.iter().map(|p| (MutationKind::InsertItems, *p)));
                }
                _ => {}
            }
        }
        for &(op, path) in &targets {
            let count = counts
                .get_mut(path.section)
                .ok_or_else(|| format!("{op} at {path} beyond post-update section bound {len}"))?;
            *count += 1;
        }
        for &(op, path) in &targets {
            if path.item >= counts[path.section] {
                return Err(format!(
                    "{op} at {path} beyond post-update bound {}",
                    counts[path.section]
                ));
            }
        }

        Ok(counts)
    }
}

impl std::fmt::Debug for IndexedSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedSurface")
            .field("counts", &self.counts)
            .field("in_transaction", &self.in_transaction())
            .field("journal", &self.journal.len())
            .finish()
    }
}

impl MutationSurface for IndexedSurface {
    fn section_count(&self) -> usize {
        self.counts.len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.counts.get(section).copied().unwrap_or(0)
    }

    fn begin_transaction(&mut self, phase: Phase) {
        if let Some(stale) = self.open.take() {
            tracing::warn!(phase = %stale.phase, "transaction never committed, discarding");
        }
        self.journal.push(Mutation::Begin(phase));
        self.open = Some(Transaction {
            phase,
            ops: Vec::new(),
        });
    }

    fn commit_transaction(&mut self, on_complete: CommitCallback) {
        let success = self.commit();
        match self.deferred.as_mut() {
            Some(queue) => queue.push((on_complete, success)),
            None => on_complete(success),
        }
    }

    fn insert_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::InsertItems)?;
        self.record(Mutation::InsertItems(positions.to_vec()));
        Ok(())
    }

    fn delete_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::DeleteItems)?;
        for &path in positions {
            self.check_item(MutationKind::DeleteItems, path)?;
        }
        self.record(Mutation::DeleteItems(positions.to_vec()));
        Ok(())
    }

    fn move_item(&mut self, from: IndexPath, to: IndexPath) -> SurfaceResult<()> {
        self.open_phase(MutationKind::MoveItem)?;
        self.check_item(MutationKind::MoveItem, from)?;
        self.record(Mutation::MoveItem { from, to });
        Ok(())
    }

    fn reload_items(&mut self, positions: &[IndexPath]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::ReloadItems)?;
        for &path in positions {
            self.check_item(MutationKind::ReloadItems, path)?;
        }
        self.record(Mutation::ReloadItems(positions.to_vec()));
        Ok(())
    }

    fn insert_sections(&mut self, indices: &[usize]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::InsertSections)?;
        self.record(Mutation::InsertSections(indices.to_vec()));
        Ok(())
    }

    fn delete_sections(&mut self, indices: &[usize]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::DeleteSections)?;
        for &index in indices {
            self.check_section(MutationKind::DeleteSections, index)?;
        }
        self.record(Mutation::DeleteSections(indices.to_vec()));
        Ok(())
    }

    fn move_section(&mut self, from: usize, to: usize) -> SurfaceResult<()> {
        self.open_phase(MutationKind::MoveSection)?;
        self.check_section(MutationKind::MoveSection, from)?;
        self.record(Mutation::MoveSection { from, to });
        Ok(())
    }

    fn reload_sections(&mut self, indices: &[usize]) -> SurfaceResult<()> {
        self.open_phase(MutationKind::ReloadSections)?;
        for &index in indices {
            self.check_section(MutationKind::ReloadSections, index)?;
        }
        self.record(Mutation::ReloadSections(indices.to_vec()));
        Ok(())
    }
}

#[cfg(feature = "async")]
impl super::surface::AsyncMutationSurface for IndexedSurface {
    fn commit_async(&mut self) -> impl std::future::Future<Output = bool> + Send + 'static {
        futures_util::future::ready(self.commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn commit(surface: &mut IndexedSurface) -> bool {
        let result = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&result);
        surface.commit_transaction(Box::new(move |ok| flag.store(ok, Ordering::SeqCst)));
        result.load(Ordering::SeqCst)
    }

    #[test]
    fn test_calls_outside_transaction() {
        let mut surface = IndexedSurface::with_counts([2]);
        assert_eq!(
            surface.delete_items(&[IndexPath::new(0, 0)]),
            Err(SurfaceError::NoTransaction { op: MutationKind::DeleteItems })
        );
        assert!(surface.journal().is_empty());
    }

    #[test]
    fn test_reload_transaction_rejects_structure() {
        let mut surface = IndexedSurface::with_counts([2]);
        surface.begin_transaction(Phase::Reload);
        assert!(matches!(
            surface.insert_items(&[IndexPath::new(0, 0)]),
            Err(SurfaceError::Rejected(_))
        ));
        assert!(surface.reload_items(&[IndexPath::new(0, 1)]).is_ok());
        assert!(commit(&mut surface));
    }

    #[test]
    fn test_pre_bounds_at_call_time() {
        let mut surface = IndexedSurface::with_counts([3]);
        surface.begin_transaction(Phase::Rearrange);
        assert_eq!(
            surface.delete_items(&[IndexPath::new(0, 5)]),
            Err(SurfaceError::OutOfBounds {
                op: MutationKind::DeleteItems,
                position: Position::Item(IndexPath::new(0, 5)),
                bound: 3,
            })
        );
        assert_eq!(
            surface.move_section(1, 0),
            Err(SurfaceError::OutOfBounds {
                op: MutationKind::MoveSection,
                position: Position::Section(1),
                bound: 1,
            })
        );
    }

    #[test]
    fn test_post_bounds_at_commit() {
        let mut surface = IndexedSurface::with_counts([2]);
        surface.begin_transaction(Phase::Rearrange);
        surface.insert_items(&[IndexPath::new(0, 3)]).unwrap();
        assert!(!commit(&mut surface));
        assert_eq!(surface.counts(), &[2]);
        assert!(surface.last_failure().unwrap().contains("post-update bound 3"));
    }

    #[test]
    fn test_commit_updates_counts() {
        let mut surface = IndexedSurface::with_counts([2, 1, 4]);
        surface.begin_transaction(Phase::Rearrange);
        surface.delete_sections(&[0]).unwrap();
        surface.insert_sections(&[0]).unwrap();
        surface.move_section(2, 1).unwrap();
        surface.insert_items(&[IndexPath::new(0, 0)]).unwrap();
        surface.delete_items(&[IndexPath::new(2, 3)]).unwrap();
        surface.move_item(IndexPath::new(1, 0), IndexPath::new(1, 3)).unwrap();
        assert!(commit(&mut surface));
        // [new, old 2, old 1]; old 1 lost its item to old 2
        assert_eq!(surface.counts(), &[1, 4, 0]);
    }

    #[test]
    fn test_layout_mismatch_fails_commit() {
        let layout = LiveLayout::new([2]);
        let mut surface = IndexedSurface::with_layout(layout.clone());

        surface.begin_transaction(Phase::Rearrange);
        layout.set([3]);
        assert!(!commit(&mut surface));
        assert!(surface.last_failure().unwrap().contains("[3]"));

        surface.begin_transaction(Phase::Rearrange);
        surface.insert_items(&[IndexPath::new(0, 2)]).unwrap();
        assert!(commit(&mut surface));
        assert_eq!(surface.counts(), &[3]);
    }

    #[test]
    fn test_deferred_callbacks() {
        let mut surface = IndexedSurface::with_counts([1]).deferred();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        surface.begin_transaction(Phase::Reload);
        surface.commit_transaction(Box::new(move |ok| flag.store(ok, Ordering::SeqCst)));
        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(surface.flush(), 1);
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_surface_is_send() {
        static_assertions::assert_impl_all!(IndexedSurface: Send);
        static_assertions::assert_impl_all!(LiveLayout: Send, Sync, Clone);
    }
}
