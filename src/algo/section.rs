//! Section Diff
//!
//! Diffs a sequence of [`Section`]s at the group level, then recurses into
//! the item lists of sections that were matched but changed.
//!
//! ```text
//! old sections ──┐                       ┌── section changes
//!                ├─ sequence diff ───────┤
//! new sections ──┘                       └── Replace(s) ──> item diff per section
//! ```
//!
//! Sections matched with no content difference get no nested diff. Nested
//! results are keyed by the new section index and remember the old one, so
//! item deletes can be addressed in the pre-mutation layout and item inserts
//! in the post-mutation layout.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::core::{Diffable, Section};

use super::change::Change;
use super::diff::{DiffConfig, DiffStats, Diagnostic, diff_with_config};

// =============================================================================
// Public Types
// =============================================================================

/// Item-level changes of one replaced section.
#[derive(Debug, Clone)]
pub struct NestedChanges<I: Diffable> {
    /// Section index in the old sequence
    pub old_section: usize,
    /// Section index in the new sequence
    pub new_section: usize,
    /// Item edit script between the two item lists
    pub changes: Vec<Change<I>>,
    pub stats: DiffStats,
    pub diagnostics: Vec<Diagnostic<I::Id>>,
}

/// Result of a section diff.
#[derive(Debug, Clone)]
#[must_use]
pub struct SectionDiff<K, I: Diffable> {
    /// Section-level edit script
    pub sections: Vec<Change<Section<K, I>>>,
    /// Item-level edit scripts, keyed by new section index
    pub items: BTreeMap<usize, NestedChanges<I>>,
    /// Whether the total change count exceeded `max_changes`
    pub should_reload: bool,
    /// Section-level statistics
    pub stats: DiffStats,
    /// Section-level diagnostics
    pub diagnostics: Vec<Diagnostic<K>>,
}

impl<K, I: Diffable> Default for SectionDiff<K, I> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            items: BTreeMap::new(),
            should_reload: false,
            stats: DiffStats::default(),
            diagnostics: Vec::new(),
        }
    }
}

impl<K, I: Diffable> SectionDiff<K, I> {
    /// Check if any changes were detected.
    pub fn has_changes(&self) -> bool {
        !self.sections.is_empty() || self.should_reload
    }

    /// Total number of changes across both levels.
    pub fn change_count(&self) -> usize {
        self.sections.len() + self.items.values().map(|n| n.changes.len()).sum::<usize>()
    }

    /// Item changes of the section now at `new_section`, if it was replaced.
    pub fn items_of(&self, new_section: usize) -> Option<&NestedChanges<I>> {
        self.items.get(&new_section)
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two section sequences.
///
/// # Example
///
/// ```
/// use tola_listdiff::{diff_sections, Change, Section};
///
/// let old = vec![Section::new("fruit", vec!["apple", "pear"])];
/// let new = vec![Section::new("fruit", vec!["apple", "kiwi", "pear"])];
///
/// let result = diff_sections(&old, &new);
/// assert!(matches!(result.sections[0], Change::Replace { .. }));
/// assert_eq!(result.items_of(0).unwrap().changes.len(), 1);
/// ```
pub fn diff_sections<K, I>(old: &[Section<K, I>], new: &[Section<K, I>]) -> SectionDiff<K, I>
where
    K: Hash + Eq + Clone + Debug,
    I: Diffable + Clone,
{
    diff_sections_with_config(old, new, DiffConfig::unbounded())
}

/// Diff two section sequences with custom configuration.
///
/// `max_changes` applies to the total across both levels.
pub fn diff_sections_with_config<K, I>(
    old: &[Section<K, I>],
    new: &[Section<K, I>],
    config: DiffConfig,
) -> SectionDiff<K, I>
where
    K: Hash + Eq + Clone + Debug,
    I: Diffable + Clone,
{
    let (mut result, jobs) = section_level(old, new, config);
    let nested_config = nested_config(config);
    result.items = jobs
        .iter()
        .map(|job| job.run(old, new, nested_config))
        .map(|nested| (nested.new_section, nested))
        .collect();
    finish(result, config)
}

/// Parallel variant of [`diff_sections_with_config`]: nested item diffs run
/// on the rayon pool, one task per replaced section.
#[cfg(feature = "parallel")]
pub fn diff_sections_par<K, I>(
    old: &[Section<K, I>],
    new: &[Section<K, I>],
    config: DiffConfig,
) -> SectionDiff<K, I>
where
    K: Hash + Eq + Clone + Debug + Send + Sync,
    I: Diffable + Clone + Send + Sync,
    I::Id: Send,
{
    use rayon::prelude::*;

    let (mut result, jobs) = section_level(old, new, config);
    let nested_config = nested_config(config);
    let nested: Vec<NestedChanges<I>> = jobs
        .par_iter()
        .map(|job| job.run(old, new, nested_config))
        .collect();
    result.items = nested.into_iter().map(|n| (n.new_section, n)).collect();
    finish(result, config)
}

// =============================================================================
// Internal
// =============================================================================

/// A matched section pair whose items need diffing.
#[derive(Debug, Clone, Copy)]
struct NestedJob {
    old_section: usize,
    new_section: usize,
}

impl NestedJob {
    fn run<K, I>(self, old: &[Section<K, I>], new: &[Section<K, I>], config: DiffConfig) -> NestedChanges<I>
    where
        I: Diffable + Clone,
    {
        let result = diff_with_config(
            &old[self.old_section].items,
            &new[self.new_section].items,
            config,
        );
        NestedChanges {
            old_section: self.old_section,
            new_section: self.new_section,
            changes: result.changes,
            stats: result.stats,
            diagnostics: result.diagnostics,
        }
    }
}

fn nested_config(config: DiffConfig) -> DiffConfig {
    DiffConfig {
        max_changes: None,
        ..config
    }
}

fn section_level<K, I>(
    old: &[Section<K, I>],
    new: &[Section<K, I>],
    config: DiffConfig,
) -> (SectionDiff<K, I>, Vec<NestedJob>)
where
    K: Hash + Eq + Clone + Debug,
    I: Diffable + Clone,
{
    let sections = diff_with_config(old, new, nested_config(config));
    let mut diagnostics = sections.diagnostics;
    let mut jobs = Vec::new();

    for change in &sections.changes {
        if let Change::Replace {
            index, old_index, ..
        } = *change
        {
            let (old_len, new_len) = (old[old_index].len(), new[index].len());
            if old_len != new_len {
                diagnostics.push(Diagnostic::SectionLengthMismatch {
                    old_index,
                    new_index: index,
                    old_len,
                    new_len,
                });
            }
            jobs.push(NestedJob {
                old_section: old_index,
                new_section: index,
            });
        }
    }

    let result = SectionDiff {
        sections: sections.changes,
        items: BTreeMap::new(),
        should_reload: false,
        stats: sections.stats,
        diagnostics,
    };
    (result, jobs)
}

fn finish<K, I: Diffable>(mut result: SectionDiff<K, I>, config: DiffConfig) -> SectionDiff<K, I> {
    let total = result.change_count();

    tracing::debug!(
        sections = result.sections.len(),
        nested = result.items.len(),
        total,
        "section diff"
    );

    if let Some(max) = config.max_changes {
        if total > max {
            result.sections.clear();
            result.items.clear();
            result.should_reload = true;
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================
