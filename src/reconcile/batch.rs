//! Plans the reconciler can apply.
//!
//! A [`BatchPlan`] knows how to validate itself against a surface's bounds
//! and how to issue its two phases. Flat lists use [`ItemBuckets`],
//! sectioned structures use [`SectionPlan`].

use std::collections::BTreeSet;

use crate::convert::{IndexPath, ItemBuckets, Position, SectionPlan};

use super::error::{MutationKind, Phase, ReconcileError, ReconcileResult, SurfaceResult};
use super::surface::MutationSurface;

/// Mutations ready to be issued against a [`MutationSurface`].
pub trait BatchPlan {
    /// Check every position against the surface's pre- and post-mutation
    /// bounds without issuing any call.
    fn check_bounds<S: MutationSurface + ?Sized>(&self, surface: &S) -> ReconcileResult<()>;

    /// Issue the reload phase. Stops at the first failing call.
    fn issue_reloads<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()>;

    /// Issue deletes, inserts and moves, in that order. Stops at the first
    /// failing call.
    fn issue_rearranges<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()>;

    /// Number of positions in the plan.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Bound checks
// =============================================================================

fn check(
    phase: Phase,
    op: MutationKind,
    position: Position,
    index: usize,
    bound: usize,
) -> ReconcileResult<()> {
    if index < bound {
        return Ok(());
    }
    tracing::warn!(%phase, %op, %position, bound, "position out of range, nothing issued");
    Err(ReconcileError::OutOfRange {
        phase,
        op,
        position,
        bound,
    })
}

/// Check one item position: its section against `sections`, then the item
/// against `items`. Both failures carry the bucket's own phase and op.
fn check_path(
    phase: Phase,
    op: MutationKind,
    path: IndexPath,
    sections: usize,
    items: usize,
) -> ReconcileResult<()> {
    check(phase, op, Position::Section(path.section), path.section, sections)?;
    check(phase, op, path.into(), path.item, items)
}

/// Check the item positions of one section.
///
/// Pre-mutation positions are those in `old_section`, checked against
/// `pre_sections`; post-mutation positions are those in `new_section`,
/// checked against `post_sections`. The post item bound follows from the pre
/// bound and the number of deletes and inserts.
fn check_section_items<S: MutationSurface + ?Sized>(
    surface: &S,
    (old_section, pre_sections): (usize, usize),
    (new_section, post_sections): (usize, usize),
    items: &ItemBuckets,
) -> ReconcileResult<()> {
    let in_old = |path: &&IndexPath| path.section == old_section;
    let in_new = |path: &&IndexPath| path.section == new_section;

    let pre = surface.item_count(old_section);
    let deleted = items.deletes.iter().filter(in_old).count()
        + items.moves.iter().map(|(from, _)| from).filter(in_old).count();
    let placed = items.inserts.iter().filter(in_new).count()
        + items.moves.iter().map(|(_, to)| to).filter(in_new).count();
    let post = (pre + placed).saturating_sub(deleted);

    let before = |op, path: &IndexPath| check_path(Phase::Rearrange, op, *path, pre_sections, pre);
    let after = |op, path: &IndexPath| check_path(Phase::Rearrange, op, *path, post_sections, post);

    for path in items.replaces.iter().filter(in_old) {
        check_path(Phase::Reload, MutationKind::ReloadItems, *path, pre_sections, pre)?;
    }
    for path in items.deletes.iter().filter(in_old) {
        before(MutationKind::DeleteItems, path)?;
    }
    for path in items.inserts.iter().filter(in_new) {
        after(MutationKind::InsertItems, path)?;
    }
    for (from, to) in &items.moves {
        if from.section == old_section {
            before(MutationKind::MoveItem, from)?;
        }
        if to.section == new_section {
            after(MutationKind::MoveItem, to)?;
        }
    }
    Ok(())
}

fn sections_of(items: &ItemBuckets) -> BTreeSet<usize> {
    items
        .inserts
        .iter()
        .chain(&items.deletes)
        .chain(&items.replaces)
        .chain(items.moves.iter().flat_map(|(from, to)| [from, to]))
        .map(|path| path.section)
        .collect()
}

// =============================================================================
// Issuing
// =============================================================================

fn issue<P: Copy + std::fmt::Debug, S: MutationSurface + ?Sized>(
    surface: &mut S,
    op: MutationKind,
    positions: &[P],
    skip_empty: bool,
    call: impl FnOnce(&mut S, &[P]) -> SurfaceResult<()>,
) -> SurfaceResult<()> {
    if skip_empty && positions.is_empty() {
        return Ok(());
    }
    tracing::trace!(%op, ?positions, "issue");
    call(surface, positions)
}

fn issue_item_rearranges<S: MutationSurface + ?Sized>(
    items: &ItemBuckets,
    surface: &mut S,
    skip_empty: bool,
) -> SurfaceResult<()> {
    issue(surface, MutationKind::DeleteItems, &items.deletes, skip_empty, |s, p| s.delete_items(p))?;
    issue(surface, MutationKind::InsertItems, &items.inserts, skip_empty, |s, p| s.insert_items(p))?;
    for &(from, to) in &items.moves {
        tracing::trace!(op = %MutationKind::MoveItem, %from, %to, "issue");
        surface.move_item(from, to)?;
    }
    Ok(())
}

// =============================================================================
// Flat plan
// =============================================================================

impl BatchPlan for ItemBuckets {
    fn check_bounds<S: MutationSurface + ?Sized>(&self, surface: &S) -> ReconcileResult<()> {
        let sections = surface.section_count();
        for section in sections_of(self) {
            check_section_items(surface, (section, sections), (section, sections), self)?;
        }
        Ok(())
    }

    fn issue_reloads<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()> {
        issue(surface, MutationKind::ReloadItems, &self.replaces, skip_empty, |s, p| s.reload_items(p))
    }

    fn issue_rearranges<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()> {
        issue_item_rearranges(self, surface, skip_empty)
    }

    fn len(&self) -> usize {
        ItemBuckets::len(self)
    }
}

// =============================================================================
// Hierarchical plan
// =============================================================================

impl BatchPlan for SectionPlan {
    fn check_bounds<S: MutationSurface + ?Sized>(&self, surface: &S) -> ReconcileResult<()> {
        let sections = &self.sections;
        let pre = surface.section_count();
        let post = (pre + sections.inserts.len()).saturating_sub(sections.deletes.len());

        for &index in &sections.replaces {
            check(Phase::Reload, MutationKind::ReloadSections, index.into(), index, pre)?;
        }
        for &index in &sections.deletes {
            check(Phase::Rearrange, MutationKind::DeleteSections, index.into(), index, pre)?;
        }
        for &index in &sections.inserts {
            check(Phase::Rearrange, MutationKind::InsertSections, index.into(), index, post)?;
        }
        for &(from, to) in &sections.moves {
            check(Phase::Rearrange, MutationKind::MoveSection, from.into(), from, pre)?;
            check(Phase::Rearrange, MutationKind::MoveSection, to.into(), to, post)?;
        }

        for nested in &self.nested {
            check_section_items(
                surface,
                (nested.old_section, pre),
                (nested.new_section, post),
                &nested.items,
            )?;
        }
        Ok(())
    }

    fn issue_reloads<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()> {
        let whole: Vec<usize> = self.section_reloads().collect();
        issue(surface, MutationKind::ReloadSections, &whole, skip_empty, |s, p| s.reload_sections(p))?;

        let items = self.merged_items();
        issue(surface, MutationKind::ReloadItems, &items.replaces, skip_empty, |s, p| s.reload_items(p))
    }

    fn issue_rearranges<S: MutationSurface + ?Sized>(
        &self,
        surface: &mut S,
        skip_empty: bool,
    ) -> SurfaceResult<()> {
        let sections = &self.sections;
        issue(surface, MutationKind::DeleteSections, &sections.deletes, skip_empty, |s, p| {
            s.delete_sections(p)
        })?;
        issue(surface, MutationKind::InsertSections, &sections.inserts, skip_empty, |s, p| {
            s.insert_sections(p)
        })?;
        for &(from, to) in &sections.moves {
            tracing::trace!(op = %MutationKind::MoveSection, from, to, "issue");
            surface.move_section(from, to)?;
        }

        issue_item_rearranges(&self.merged_items(), surface, skip_empty)
    }

    fn len(&self) -> usize {
        self.sections.len() + self.nested.iter().map(|n| n.items.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::{diff, diff_sections};
    use crate::convert::{convert, convert_sections, NestedBuckets};
    use crate::core::Section;
    use crate::reconcile::indexed::{IndexedSurface, Mutation};

    #[test]
    fn test_item_bounds_pre_and_post() {
        let surface = IndexedSurface::with_counts([3]);

        let mut plan = ItemBuckets::new();
        plan.deletes.push(IndexPath::new(0, 2));
        plan.inserts.push(IndexPath::new(0, 2));
        assert!(plan.check_bounds(&surface).is_ok());

        // post = 3 - 1 + 1 = 3
        plan.inserts[0] = IndexPath::new(0, 3);
        let err = plan.check_bounds(&surface).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OutOfRange {
                phase: Phase::Rearrange,
                op: MutationKind::InsertItems,
                position: Position::Item(IndexPath::new(0, 3)),
                bound: 3,
            }
        );
    }

    #[test]
    fn test_item_bounds_unknown_section() {
        let surface = IndexedSurface::with_counts([3]);
        let plan = convert(&diff(&[1], &[2]), 4);
        let err = plan.check_bounds(&surface).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OutOfRange {
                phase: Phase::Rearrange,
                op: MutationKind::DeleteItems,
                position: Position::Section(4),
                bound: 1,
            }
        );
    }

    #[test]
    fn test_reload_only_plan_unknown_section() {
        let surface = IndexedSurface::with_counts([3]);
        let mut plan = ItemBuckets::new();
        plan.replaces.push(IndexPath::new(4, 0));

        let err = plan.check_bounds(&surface).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OutOfRange {
                phase: Phase::Reload,
                op: MutationKind::ReloadItems,
                position: Position::Section(4),
                bound: 1,
            }
        );
    }

    #[test]
    fn test_nested_section_bound_names_bucket_op() {
        let surface = IndexedSurface::with_counts([2, 2]);

        let mut items = ItemBuckets::new();
        items.deletes.push(IndexPath::new(5, 0));
        let mut plan = SectionPlan::default();
        plan.nested.push(NestedBuckets {
            old_section: 5,
            new_section: 0,
            items,
        });
        let err = plan.check_bounds(&surface).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OutOfRange {
                phase: Phase::Rearrange,
                op: MutationKind::DeleteItems,
                position: Position::Section(5),
                bound: 2,
            }
        );

        let mut items = ItemBuckets::new();
        items.moves.push((IndexPath::new(0, 0), IndexPath::new(3, 0)));
        let mut plan = SectionPlan::default();
        plan.nested.push(NestedBuckets {
            old_section: 0,
            new_section: 3,
            items,
        });
        let err = plan.check_bounds(&surface).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::OutOfRange {
                phase: Phase::Rearrange,
                op: MutationKind::MoveItem,
                position: Position::Section(3),
                bound: 2,
            }
        );
    }

    #[test]
    fn test_reload_bound_uses_pre_layout() {
        let surface = IndexedSurface::with_counts([2]);
        let mut plan = ItemBuckets::new();
        plan.replaces.push(IndexPath::new(0, 2));
        let err = plan.check_bounds(&surface).unwrap_err();
        assert!(matches!(err, ReconcileError::OutOfRange { phase: Phase::Reload, bound: 2, .. }));
    }

    #[test]
    fn test_section_plan_bounds() {
        let old = vec![Section::new('a', vec![1, 2]), Section::new('b', vec![3])];
        let new = vec![Section::new('b', vec![3, 4]), Section::new('c', vec![])];
        let plan = convert_sections(&diff_sections(&old, &new));

        assert!(plan.check_bounds(&IndexedSurface::with_counts([2, 1])).is_ok());
        // Live structure out of sync: only one section on screen.
        assert!(plan.check_bounds(&IndexedSurface::with_counts([2])).is_err());
    }

    #[test]
    fn test_issue_order_and_skip_empty() {
        let mut surface = IndexedSurface::with_counts([3]);
        let plan = convert(&diff(&['a', 'b', 'c'], &['c', 'a', 'x']), 0);

        surface.begin_transaction(Phase::Rearrange);
        plan.issue_rearranges(&mut surface, true).unwrap();
        let journal = surface.journal();
        assert_eq!(journal[0], Mutation::Begin(Phase::Rearrange));
        assert_eq!(journal[1], Mutation::DeleteItems(vec![IndexPath::new(0, 1)]));
        assert_eq!(journal[2], Mutation::InsertItems(vec![IndexPath::new(0, 2)]));
        assert_eq!(
            journal[3],
            Mutation::MoveItem {
                from: IndexPath::new(0, 2),
                to: IndexPath::new(0, 0)
            }
        );
        assert_eq!(journal.len(), 4);
    }

    #[test]
    fn test_issue_empty_calls_when_not_skipping() {
        let mut surface = IndexedSurface::with_counts([1]);
        let plan = ItemBuckets::new();
        surface.begin_transaction(Phase::Reload);
        plan.issue_reloads(&mut surface, false).unwrap();
        assert_eq!(surface.journal()[1], Mutation::ReloadItems(vec![]));
    }
}
