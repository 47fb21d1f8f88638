//! Core traits: the identity contract every diffable element supplies.
//!
//! Two elements are the *same entity* iff their identities match, and
//! *unchanged* iff they are additionally content-equal. Identity must be
//! unique within one version of a sequence; it need not be unique across
//! the old and new versions.

use std::fmt::Debug;
use std::hash::Hash;

use crate::id::StableId;

// =============================================================================
// Diffable
// =============================================================================

/// Identity and content equality for elements of a diffed sequence.
///
/// Resolved at compile time: the differ is generic over `T: Diffable`, so no
/// runtime type checks are involved.
///
/// # Example
///
/// ```
/// use tola_listdiff::Diffable;
///
/// #[derive(Clone)]
/// struct Row { id: u32, title: String }
///
/// impl Diffable for Row {
///     type Id = u32;
///
///     fn identity(&self) -> u32 {
///         self.id
///     }
///
///     fn content_equals(&self, other: &Self) -> bool {
///         self.title == other.title
///     }
/// }
/// ```
pub trait Diffable {
    /// Identity key used to recognize the same logical element across versions.
    type Id: Hash + Eq + Clone + Debug;

    /// Stable identity of this element.
    fn identity(&self) -> Self::Id;

    /// Whether the displayable content of `self` and `other` is the same.
    ///
    /// Only ever called on elements that share an identity.
    fn content_equals(&self, other: &Self) -> bool;
}

/// Value types are their own identity.
macro_rules! impl_value_diffable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Diffable for $ty {
                type Id = $ty;

                #[inline]
                fn identity(&self) -> Self::Id {
                    self.clone()
                }

                #[inline]
                fn content_equals(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_value_diffable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String,
    StableId,
);

impl<'a> Diffable for &'a str {
    type Id = &'a str;

    #[inline]
    fn identity(&self) -> Self::Id {
        self
    }

    #[inline]
    fn content_equals(&self, other: &Self) -> bool {
        self == other
    }
}

// =============================================================================
// Section
// =============================================================================

/// A named group holding an ordered sub-sequence of items.
///
/// Sections are diffable at the group level. Their content equality is
/// positional: same identity and the same items (identity and content) at the
/// same positions. It decides whether the item lists need a nested diff, it
/// does not diff them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<K, I> {
    /// Section identity.
    pub id: K,
    /// Items in display order.
    pub items: Vec<I>,
}

impl<K, I> Section<K, I> {
    /// Create a section.
    pub fn new(id: K, items: impl Into<Vec<I>>) -> Self {
        Self {
            id,
            items: items.into(),
        }
    }

    /// Number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the section holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K, I> Section<K, I>
where
    K: PartialEq,
    I: Diffable,
{
    /// Positional item comparison.
    ///
    /// Sequences with mismatched item counts are simply unequal; the section
    /// differ reports them as a diagnostic.
    pub fn items_equal(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|(a, b)| a.identity() == b.identity() && a.content_equals(b))
    }
}

impl<K, I> Diffable for Section<K, I>
where
    K: Hash + Eq + Clone + Debug,
    I: Diffable,
{
    type Id = K;

    #[inline]
    fn identity(&self) -> K {
        self.id.clone()
    }

    fn content_equals(&self, other: &Self) -> bool {
        self.id == other.id && self.items_equal(other)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: u32,
        title: &'static str,
    }

    impl Diffable for Row {
        type Id = u32;

        fn identity(&self) -> u32 {
            self.id
        }

        fn content_equals(&self, other: &Self) -> bool {
            self.title == other.title
        }
    }

    #[test]
    fn test_value_types_are_their_own_identity() {
        assert_eq!(42u32.identity(), 42);
        assert!("a".content_equals(&"a"));
        assert!(!String::from("a").content_equals(&String::from("b")));
    }

    #[test]
    fn test_section_equal_when_items_match_positionally() {
        let a = Section::new("s1", vec![Row { id: 1, title: "x" }, Row { id: 2, title: "y" }]);
        let b = Section::new("s1", vec![Row { id: 1, title: "x" }, Row { id: 2, title: "y" }]);
        assert!(a.content_equals(&b));
    }

    #[test]
    fn test_section_unequal_on_reorder_or_content() {
        let a = Section::new("s1", vec![Row { id: 1, title: "x" }, Row { id: 2, title: "y" }]);
        let reordered = Section::new("s1", vec![Row { id: 2, title: "y" }, Row { id: 1, title: "x" }]);
        let edited = Section::new("s1", vec![Row { id: 1, title: "x" }, Row { id: 2, title: "z" }]);
        assert!(!a.content_equals(&reordered));
        assert!(!a.content_equals(&edited));
    }

    #[test]
    fn test_section_unequal_on_length_mismatch() {
        let a = Section::new("s1", vec![1, 2]);
        let b = Section::new("s1", vec![1, 2, 3]);
        assert!(!a.items_equal(&b));
        assert_eq!(b.len(), 3);
    }
}
