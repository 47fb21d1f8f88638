//! Per-kind position buckets.

use smallvec::SmallVec;

use crate::algo::Change;

use super::index_path::IndexPath;

/// Positions of an edit script grouped by change kind.
///
/// - `deletes`, `replaces`, `moves.0`: pre-mutation positions
/// - `inserts`, `moves.1`: post-mutation positions
///
/// Replaces use the old position because reloads are issued against the
/// pre-mutation layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBuckets<P> {
    pub inserts: SmallVec<[P; 8]>,
    pub deletes: SmallVec<[P; 8]>,
    pub replaces: SmallVec<[P; 8]>,
    pub moves: SmallVec<[(P, P); 4]>,
}

/// Buckets addressed by item-within-section.
pub type ItemBuckets = ChangeBuckets<IndexPath>;

/// Buckets addressed by section index.
pub type SectionBuckets = ChangeBuckets<usize>;

impl<P> Default for ChangeBuckets<P> {
    fn default() -> Self {
        Self {
            inserts: SmallVec::new(),
            deletes: SmallVec::new(),
            replaces: SmallVec::new(),
            moves: SmallVec::new(),
        }
    }
}

impl<P> ChangeBuckets<P> {
    /// Create empty buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `changes` by kind, addressing old positions with `old_pos` and
    /// new positions with `new_pos`.
    pub fn from_changes<T>(
        changes: &[Change<T>],
        old_pos: impl Fn(usize) -> P,
        new_pos: impl Fn(usize) -> P,
    ) -> Self {
        let mut buckets = Self::new();
        for change in changes {
            match change {
                Change::Insert { index, .. } => buckets.inserts.push(new_pos(*index)),
                Change::Delete { index, .. } => buckets.deletes.push(old_pos(*index)),
                Change::Replace { old_index, .. } => buckets.replaces.push(old_pos(*old_index)),
                Change::Move { from, to, .. } => buckets.moves.push((old_pos(*from), new_pos(*to))),
            }
        }
        buckets
    }

    /// Total number of positions across all buckets.
    pub fn len(&self) -> usize {
        self.inserts.len() + self.deletes.len() + self.replaces.len() + self.moves.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether there is anything for the structural (rearrange) phase.
    pub fn has_structural(&self) -> bool {
        !self.inserts.is_empty() || !self.deletes.is_empty() || !self.moves.is_empty()
    }

    /// Append another bucket set.
    pub fn extend(&mut self, other: ChangeBuckets<P>) {
        self.inserts.extend(other.inserts);
        self.deletes.extend(other.deletes);
        self.replaces.extend(other.replaces);
        self.moves.extend(other.moves);
    }
}

/// Translate a flat edit script into item positions within `section`.
///
/// # Example
///
/// ```
/// use tola_listdiff::{convert, diff, IndexPath};
///
/// let changes = diff(&['a', 'b'], &['b', 'c']);
/// let buckets = convert(&changes, 2);
/// assert_eq!(buckets.deletes.as_slice(), &[IndexPath::new(2, 0)]);
/// assert_eq!(buckets.inserts.as_slice(), &[IndexPath::new(2, 1)]);
/// ```
pub fn convert<T>(changes: &[Change<T>], section: usize) -> ItemBuckets {
    let at = |item| IndexPath::new(section, item);
    ChangeBuckets::from_changes(changes, at, at)
}

/// Translate a section-level edit script into section indices.
pub fn convert_section_changes<T>(changes: &[Change<T>]) -> SectionBuckets {
    ChangeBuckets::from_changes(changes, |index| index, |index| index)
}
