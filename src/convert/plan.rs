//! Hierarchical translation: section buckets plus nested item buckets.

use crate::algo::{NestedChanges, SectionDiff};
use crate::core::Diffable;

use super::buckets::{convert_section_changes, ChangeBuckets, ItemBuckets, SectionBuckets};
use super::index_path::IndexPath;

/// Item buckets of one replaced section.
///
/// Pre-mutation positions (deletes, replaces, move sources) use
/// `old_section`; post-mutation positions (inserts, move destinations) use
/// `new_section`. Item mutations never cross section boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedBuckets {
    pub old_section: usize,
    pub new_section: usize,
    pub items: ItemBuckets,
}

impl NestedBuckets {
    /// Translate the nested changes of one section.
    pub fn from_nested<I: Diffable>(nested: &NestedChanges<I>) -> Self {
        let (old_section, new_section) = (nested.old_section, nested.new_section);
        Self {
            old_section,
            new_section,
            items: ChangeBuckets::from_changes(
                &nested.changes,
                |item| IndexPath::new(old_section, item),
                |item| IndexPath::new(new_section, item),
            ),
        }
    }
}

/// Translated section diff, ready for the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPlan {
    /// Section-level positions
    pub sections: SectionBuckets,
    /// Item-level positions per replaced section, ordered by new section index
    pub nested: Vec<NestedBuckets>,
}

impl SectionPlan {
    /// Whether the plan contains no mutation at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.nested.iter().all(|n| n.items.is_empty())
    }

    /// All nested item buckets merged into one set.
    pub fn merged_items(&self) -> ItemBuckets {
        let mut merged = ItemBuckets::new();
        for nested in &self.nested {
            merged.extend(nested.items.clone());
        }
        merged
    }

    /// Section replaces (old indices) that need a whole-section reload.
    ///
    /// A replaced section is covered by its nested item buckets when they hold
    /// at least one position. Plans from [`convert_sections`] always carry
    /// nested changes for every replace; a section without nested buckets, or
    /// with empty ones, only occurs in hand-built plans.
    pub fn section_reloads(&self) -> impl Iterator<Item = usize> + '_ {
        self.sections.replaces.iter().copied().filter(|old| {
            !self
                .nested
                .iter()
                .any(|n| n.old_section == *old && !n.items.is_empty())
        })
    }
}

/// Translate a section diff into section and nested item positions.
pub fn convert_sections<K, I: Diffable>(diff: &SectionDiff<K, I>) -> SectionPlan {
    SectionPlan {
        sections: convert_section_changes(&diff.sections),
        nested: diff.items.values().map(NestedBuckets::from_nested).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::diff_sections;
    use crate::core::Section;

    #[test]
    fn test_nested_positions_use_old_and_new_sections() {
        let old = vec![Section::new("a", vec![1]), Section::new("b", vec![1, 2, 3])];
        let new = vec![Section::new("b", vec![3, 4, 1]), Section::new("a", vec![1])];
        let plan = convert_sections(&diff_sections(&old, &new));

        assert_eq!(plan.nested.len(), 1);
        let nested = &plan.nested[0];
        assert_eq!((nested.old_section, nested.new_section), (1, 0));
        assert_eq!(nested.items.deletes.as_slice(), &[IndexPath::new(1, 1)]);
        assert_eq!(nested.items.inserts.as_slice(), &[IndexPath::new(0, 1)]);
        assert_eq!(nested.items.moves.as_slice(), &[(IndexPath::new(1, 2), IndexPath::new(0, 0))]);

        assert_eq!(plan.sections.replaces.as_slice(), &[1]);
        assert_eq!(plan.section_reloads().count(), 0);
    }

    #[test]
    fn test_section_reloads_without_nested() {
        let mut plan = SectionPlan::default();
        plan.sections.replaces.push(2);
        assert_eq!(plan.section_reloads().collect::<Vec<_>>(), vec![2]);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_section_reloads_with_empty_nested() {
        let mut plan = SectionPlan::default();
        plan.sections.replaces.extend([0, 1]);
        plan.nested.push(NestedBuckets {
            old_section: 0,
            new_section: 0,
            items: ItemBuckets::new(),
        });
        let mut covered = ItemBuckets::new();
        covered.inserts.push(IndexPath::new(1, 0));
        plan.nested.push(NestedBuckets {
            old_section: 1,
            new_section: 1,
            items: covered,
        });
        assert_eq!(plan.section_reloads().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_every_diffed_replace_has_nested_changes() {
        let old = vec![Section::new(1, vec!['a']), Section::new(2, vec!['b', 'c'])];
        let new = vec![Section::new(2, vec!['c']), Section::new(1, vec!['a', 'd'])];
        let plan = convert_sections(&diff_sections(&old, &new));
        assert_eq!(plan.sections.replaces.len(), 2);
        assert!(plan.nested.iter().all(|n| !n.items.is_empty()));
        assert_eq!(plan.section_reloads().count(), 0);
    }

    #[test]
    fn test_merged_items() {
        let old = vec![Section::new(0, vec!['a']), Section::new(1, vec!['b'])];
        let new = vec![Section::new(0, vec!['a', 'x']), Section::new(1, vec![])];
        let plan = convert_sections(&diff_sections(&old, &new));
        let merged = plan.merged_items();
        assert_eq!(merged.inserts.as_slice(), &[IndexPath::new(0, 1)]);
        assert_eq!(merged.deletes.as_slice(), &[IndexPath::new(1, 0)]);
    }
}
