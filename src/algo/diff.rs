//! Sequence Diff
//!
//! Computes the edit script between two flat sequences of [`Diffable`]
//! elements. This is a **pure algorithm module**: no I/O, no shared state,
//! safe to call concurrently for independent inputs.
//!
//! # Architecture: Diff/Apply Separation
//!
//! ```text
//! diff(old, new) -> Vec<Change<T>>        // pure data
//!       |
//!       v
//! convert(changes, section) -> buckets    // positions only
//!       |
//!       v
//! Reconciler::apply(surface, buckets, ..) // mutation calls
//! ```
//!
//! # Output Order
//!
//! 1. `Delete`s in ascending old position
//! 2. For each new position in ascending order: `Insert`, or `Replace`
//!    followed by `Move` when the pair is both edited and reordered
//!
//! Repeated calls with identical inputs produce identical output.

use std::fmt;

use crate::core::Diffable;

use super::change::Change;
use super::heckel::{longest_increasing_subsequence, match_sequences, repeated_identities};

// =============================================================================
// Public Types
// =============================================================================

/// Configuration for diff limits and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffConfig {
    /// Maximum number of changes before falling back to a full reload.
    /// `None` means unbounded. Default: `None`
    pub max_changes: Option<usize>,
    /// Whether to scan both sequences for repeated identities.
    /// Default: `true`
    pub report_duplicates: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_changes: None,
            report_duplicates: true,
        }
    }
}

impl DiffConfig {
    /// Create config with custom limits.
    pub fn new(max_changes: Option<usize>, report_duplicates: bool) -> Self {
        Self {
            max_changes,
            report_duplicates,
        }
    }

    /// No change limit, no duplicate scan. Used by [`diff`].
    pub fn unbounded() -> Self {
        Self {
            max_changes: None,
            report_duplicates: false,
        }
    }

    /// Config for small views where animating many rows is pointless:
    /// fall back to a reload past 100 changes.
    pub fn small() -> Self {
        Self {
            max_changes: Some(100),
            report_duplicates: true,
        }
    }
}

/// Statistics from a diff.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct DiffStats {
    /// Pairs unchanged in both content and relative order
    pub kept: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub replaced: usize,
    pub moved: usize,
}

impl DiffStats {
    /// Total number of changes.
    pub fn edit_count(&self) -> usize {
        self.inserted + self.deleted + self.replaced + self.moved
    }

    /// Check if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.edit_count() == 0
    }
}

/// Which input sequence a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Old => "old",
            Self::New => "new",
        })
    }
}

/// Malformed-input report attached to a diff result.
///
/// Diagnostics never abort a diff. They tell the caller which part of the
/// output rests on an implementation-defined choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<K> {
    /// An identity occurs more than once in one sequence.
    ///
    /// Repeats are paired by proximity to certain pairs, then left to right;
    /// move/replace attribution among them is stable but not meaningful.
    DuplicateIdentity {
        side: Side,
        identity: K,
        first_index: usize,
        occurrences: usize,
    },
    /// Two matched sections were compared with different item counts.
    SectionLengthMismatch {
        old_index: usize,
        new_index: usize,
        old_len: usize,
        new_len: usize,
    },
}

impl<K: fmt::Debug> fmt::Display for Diagnostic<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentity {
                side,
                identity,
                first_index,
                occurrences,
            } => write!(
                f,
                "identity {identity:?} occurs {occurrences} times in {side} sequence (first at {first_index})"
            ),
            Self::SectionLengthMismatch {
                old_index,
                new_index,
                old_len,
                new_len,
            } => write!(
                f,
                "section {old_index} -> {new_index} compared with {old_len} vs {new_len} items"
            ),
        }
    }
}

/// Result of a sequence diff.
#[derive(Debug, Clone)]
#[must_use]
pub struct DiffResult<T: Diffable> {
    /// Edit script (empty when `should_reload` is set)
    pub changes: Vec<Change<T>>,
    /// Whether the diff exceeded `max_changes`
    pub should_reload: bool,
    /// Reason for reload (if should_reload is true)
    pub reload_reason: Option<String>,
    /// Statistics about the diff
    pub stats: DiffStats,
    /// Malformed-input reports
    pub diagnostics: Vec<Diagnostic<T::Id>>,
}

impl<T: Diffable> Default for DiffResult<T> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
            should_reload: false,
            reload_reason: None,
            stats: DiffStats::default(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T: Diffable> DiffResult<T> {
    /// Create a result that triggers reload.
    pub fn reload(reason: impl Into<String>) -> Self {
        Self {
            should_reload: true,
            reload_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Check if any changes were detected.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty() || self.should_reload
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two sequences by identity, returning the edit script.
///
/// # Example
///
/// ```
/// use tola_listdiff::{diff, Change};
///
/// let changes = diff(&["a", "b", "c"], &["a", "c", "b"]);
/// assert_eq!(changes.len(), 1);
/// assert!(matches!(changes[0], Change::Move { .. }));
/// ```
pub fn diff<T>(old: &[T], new: &[T]) -> Vec<Change<T>>
where
    T: Diffable + Clone,
{
    diff_with_config(old, new, DiffConfig::unbounded()).changes
}

/// Diff two sequences with custom configuration.
pub fn diff_with_config<T>(old: &[T], new: &[T], config: DiffConfig) -> DiffResult<T>
where
    T: Diffable + Clone,
{
    let mut diagnostics = Vec::new();
    if config.report_duplicates {
        collect_duplicates(old, Side::Old, &mut diagnostics);
        collect_duplicates(new, Side::New, &mut diagnostics);
    }

    let (changes, stats) = edit_script(old, new);

    tracing::debug!(
        old_len = old.len(),
        new_len = new.len(),
        inserted = stats.inserted,
        deleted = stats.deleted,
        replaced = stats.replaced,
        moved = stats.moved,
        duplicates = diagnostics.len(),
        "sequence diff"
    );

    if let Some(max) = config.max_changes {
        if changes.len() > max {
            let mut result = DiffResult::reload(format!(
                "{} changes exceed limit of {}",
                changes.len(),
                max
            ));
            result.stats = stats;
            result.diagnostics = diagnostics;
            return result;
        }
    }

    DiffResult {
        changes,
        should_reload: false,
        reload_reason: None,
        stats,
        diagnostics,
    }
}

// =============================================================================
// Internal
// =============================================================================

fn collect_duplicates<T: Diffable>(items: &[T], side: Side, out: &mut Vec<Diagnostic<T::Id>>) {
    out.extend(
        repeated_identities(items)
            .into_iter()
            .map(|r| Diagnostic::DuplicateIdentity {
                side,
                identity: r.identity,
                first_index: r.first_index,
                occurrences: r.occurrences,
            }),
    );
}

fn edit_script<T>(old: &[T], new: &[T]) -> (Vec<Change<T>>, DiffStats)
where
    T: Diffable + Clone,
{
    let mut stats = DiffStats::default();

    // Quick paths
    if old.is_empty() && new.is_empty() {
        return (Vec::new(), stats);
    }

    if old.is_empty() {
        stats.inserted = new.len();
        let changes = new
            .iter()
            .enumerate()
            .map(|(index, item)| Change::Insert { index, item: item.clone() })
            .collect();
        return (changes, stats);
    }

    if new.is_empty() {
        stats.deleted = old.len();
        let changes = old
            .iter()
            .enumerate()
            .map(|(index, item)| Change::Delete { index, item: item.clone() })
            .collect();
        return (changes, stats);
    }

    let matching = match_sequences(old, new);
    let mut changes = Vec::new();

    for (index, paired) in matching.old_to_new.iter().enumerate() {
        if paired.is_none() {
            changes.push(Change::Delete {
                index,
                item: old[index].clone(),
            });
            stats.deleted += 1;
        }
    }

    // Pairs in new order; the ones outside the longest increasing run of old
    // positions are the moves.
    let (paired_new, paired_old): (Vec<usize>, Vec<usize>) = matching
        .new_to_old
        .iter()
        .enumerate()
        .filter_map(|(new_index, old_index)| old_index.map(|o| (new_index, o)))
        .unzip();
    let mut in_order = vec![false; new.len()];
    for pos in longest_increasing_subsequence(&paired_old) {
        in_order[paired_new[pos]] = true;
    }

    for (index, paired) in matching.new_to_old.iter().enumerate() {
        let Some(old_index) = *paired else {
            changes.push(Change::Insert {
                index,
                item: new[index].clone(),
            });
            stats.inserted += 1;
            continue;
        };

        let replaced = !old[old_index].content_equals(&new[index]);
        if replaced {
            changes.push(Change::Replace {
                index,
                old_index,
                old_item: old[old_index].clone(),
                new_item: new[index].clone(),
            });
            stats.replaced += 1;
        }

        if !in_order[index] {
            changes.push(Change::Move {
                from: old_index,
                to: index,
                item: new[index].clone(),
            });
            stats.moved += 1;
        } else if !replaced {
            stats.kept += 1;
        }
    }

    (changes, stats)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Element with identity `id` and content `rev`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: u8,
        rev: u8,
    }

    impl Diffable for Item {
        type Id = u8;

        fn identity(&self) -> u8 {
            self.id
        }

        fn content_equals(&self, other: &Self) -> bool {
            self.rev == other.rev
        }
    }

    fn item(id: u8, rev: u8) -> Item {
        Item { id, rev }
    }

    fn count<T>(changes: &[Change<T>], f: impl Fn(&Change<T>) -> bool) -> usize {
        changes.iter().filter(|c| f(c)).count()
    }

    #[test]
    fn test_empty_sequences() {
        let result = diff_with_config::<char>(&[], &[], DiffConfig::default());
        assert!(result.changes.is_empty());
        assert!(result.stats.is_empty());
        assert!(!result.has_changes());
    }

    #[test]
    fn test_insert_all() {
        let changes = diff(&[], &['x', 'y']);
        assert_eq!(
            changes,
            vec![
                Change::Insert { index: 0, item: 'x' },
                Change::Insert { index: 1, item: 'y' },
            ]
        );
    }

    #[test]
    fn test_delete_all() {
        let changes = diff(&['a', 'b', 'c'], &[]);
        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(Change::is_delete));
        assert_eq!(changes[2], Change::Delete { index: 2, item: 'c' });
    }

    #[test]
    fn test_identical_is_empty() {
        let items = vec![item(1, 0), item(2, 0), item(3, 0)];
        assert!(diff(&items, &items).is_empty());
    }

    #[test]
    fn test_swap_is_single_move() {
        let changes = diff(&['a', 'b', 'c'], &['a', 'c', 'b']);
        assert_eq!(changes, vec![Change::Move { from: 2, to: 1, item: 'c' }]);
    }

    #[test]
    fn test_content_change_is_replace() {
        let old = vec![item(1, 0), item(2, 0)];
        let new = vec![item(1, 1), item(2, 0)];
        let changes = diff(&old, &new);
        assert_eq!(
            changes,
            vec![Change::Replace {
                index: 0,
                old_index: 0,
                old_item: item(1, 0),
                new_item: item(1, 1),
            }]
        );
    }

    #[test]
    fn test_replace_and_move_are_independent() {
        let old = vec![item(1, 0), item(2, 0), item(3, 0)];
        let new = vec![item(1, 0), item(3, 1), item(2, 0)];
        let changes = diff(&old, &new);
        assert_eq!(
            changes,
            vec![
                Change::Replace {
                    index: 1,
                    old_index: 2,
                    old_item: item(3, 0),
                    new_item: item(3, 1),
                },
                Change::Move { from: 2, to: 1, item: item(3, 1) },
            ]
        );
    }

    #[test]
    fn test_mixed_operations() {
        let changes = diff(&['a', 'b', 'c', 'd'], &['a', 'e', 'c']);
        assert_eq!(
            changes,
            vec![
                Change::Delete { index: 1, item: 'b' },
                Change::Delete { index: 3, item: 'd' },
                Change::Insert { index: 1, item: 'e' },
            ]
        );
    }

    #[test]
    fn test_deletes_do_not_cause_moves() {
        let changes = diff(&['a', 'b', 'c', 'd'], &['b', 'd']);
        assert_eq!(count(&changes, |c| c.is_move()), 0);
        assert_eq!(count(&changes, |c| c.is_delete()), 2);
    }

    #[test]
    fn test_reverse_moves_all_but_one() {
        let result = diff_with_config(&[1, 2, 3, 4], &[4, 3, 2, 1], DiffConfig::default());
        assert_eq!(result.stats.moved, 3);
        assert_eq!(result.stats.kept, 1);
    }

    #[test]
    fn test_duplicate_diagnostics() {
        let result = diff_with_config(&['x', 'a', 'x'], &['a', 'x'], DiffConfig::default());
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::DuplicateIdentity {
                side: Side::Old,
                identity: 'x',
                first_index: 0,
                occurrences: 2,
            }]
        );
        assert_eq!(
            result.diagnostics[0].to_string(),
            "identity 'x' occurs 2 times in old sequence (first at 0)"
        );
    }

    #[test]
    fn test_triple_duplicates_pair_deterministically() {
        let old = ['x', 'x', 'x', 'a'];
        let new = ['a', 'x', 'x', 'x'];
        let first = diff(&old, &new);
        let second = diff(&old, &new);
        assert_eq!(first, second);
        assert_eq!(count(&first, |c| c.is_insert()), 0);
        assert_eq!(count(&first, |c| c.is_delete()), 0);
        assert_eq!(count(&first, |c| c.is_move()), 1);
    }

    #[test]
    fn test_max_changes_triggers_reload() {
        let result = diff_with_config(&[1, 2, 3], &[4, 5, 6], DiffConfig::new(Some(2), false));
        assert!(result.should_reload);
        assert!(result.changes.is_empty());
        assert_eq!(result.stats.edit_count(), 6);
        assert!(result.reload_reason.unwrap().contains("limit of 2"));
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Sequences with unique identities drawn from a small pool, so that old
    /// and new overlap often.
    fn unique_items() -> impl Strategy<Value = Vec<Item>> {
        proptest::sample::subsequence((0u8..24).collect::<Vec<_>>(), 0..24)
            .prop_shuffle()
            .prop_flat_map(|ids| {
                let n = ids.len();
                (Just(ids), proptest::collection::vec(0u8..2, n))
            })
            .prop_map(|(ids, revs)| ids.into_iter().zip(revs).map(|(id, rev)| item(id, rev)).collect())
    }

    proptest! {
        #[test]
        fn prop_round_trip(old in unique_items(), new in unique_items()) {
            let changes = diff(&old, &new);
            let rebuilt = crate::patch::apply_changes(&old, &changes).unwrap();
            prop_assert_eq!(rebuilt, new);
        }

        #[test]
        fn prop_idempotent(items in unique_items()) {
            prop_assert!(diff(&items, &items).is_empty());
        }

        #[test]
        fn prop_cardinality(old in unique_items(), new in unique_items()) {
            let changes = diff(&old, &new);
            let inserts = count(&changes, |c| c.is_insert()) as isize;
            let deletes = count(&changes, |c| c.is_delete()) as isize;
            prop_assert_eq!(inserts - deletes, new.len() as isize - old.len() as isize);
        }

        #[test]
        fn prop_unchanged_never_reported(old in unique_items(), new in unique_items()) {
            let changes = diff(&old, &new);
            for change in &changes {
                let id = match change {
                    Change::Insert { item, .. } | Change::Delete { item, .. } => item.id,
                    Change::Replace { new_item, .. } => new_item.id,
                    // Unchanged elements may still need to be moved.
                    Change::Move { .. } => continue,
                };
                let unchanged = old.iter().any(|o| o.id == id && new.contains(o));
                prop_assert!(!unchanged, "unchanged element {} reported in {:?}", id, change);
            }
        }

        #[test]
        fn prop_edits_without_reorder_are_replaces(old in unique_items(), seed in any::<u32>()) {
            let new: Vec<Item> = old
                .iter()
                .enumerate()
                .map(|(i, it)| item(it.id, it.rev ^ ((seed >> (i % 32)) & 1) as u8))
                .collect();
            let changes = diff(&old, &new);
            prop_assert!(changes.iter().all(Change::is_replace));
            let edited = old.iter().zip(&new).filter(|(a, b)| a != b).count();
            prop_assert_eq!(changes.len(), edited);
        }

        #[test]
        fn prop_deterministic(old in unique_items(), new in unique_items()) {
            prop_assert_eq!(diff(&old, &new), diff(&old, &new));
        }

        #[test]
        fn prop_moves_are_minimal(old in unique_items(), new in unique_items()) {
            let result = diff_with_config(&old, &new, DiffConfig::default());
            let paired: Vec<usize> = new
                .iter()
                .filter_map(|n| old.iter().position(|o| o.id == n.id))
                .collect();
            let lis = longest_increasing_subsequence(&paired).len();
            prop_assert_eq!(result.stats.moved, paired.len() - lis);
        }
    }
}
