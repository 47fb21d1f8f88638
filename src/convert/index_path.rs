//! Structured positions.

use std::fmt;

/// Address of an item within a sectioned structure.
///
/// Ordered by section, then item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl From<(usize, usize)> for IndexPath {
    #[inline]
    fn from((section, item): (usize, usize)) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.item)
    }
}

/// Either granularity a mutation can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Section(usize),
    Item(IndexPath),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(index) => write!(f, "section {index}"),
            Self::Item(path) => write!(f, "item {path}"),
        }
    }
}

impl From<usize> for Position {
    #[inline]
    fn from(index: usize) -> Self {
        Self::Section(index)
    }
}

impl From<IndexPath> for Position {
    #[inline]
    fn from(path: IndexPath) -> Self {
        Self::Item(path)
    }
}
