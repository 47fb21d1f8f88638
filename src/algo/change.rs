//! Edit-script records.
//!
//! Index semantics are never mixed: `Delete::index`, `Replace::old_index` and
//! `Move::from` are positions in the old sequence, `Insert::index`,
//! `Replace::index` and `Move::to` are positions in the new sequence.

// =============================================================================
// Change
// =============================================================================

/// One operation of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// `item` appears at `index` in new only.
    Insert { index: usize, item: T },
    /// `item` at `index` in old has no counterpart in new.
    Delete { index: usize, item: T },
    /// Same identity, different content.
    ///
    /// `index` is the new position, `old_index` the matched old position.
    Replace {
        index: usize,
        old_index: usize,
        old_item: T,
        new_item: T,
    },
    /// Same identity, relative order changed.
    Move { from: usize, to: usize, item: T },
}

/// Discriminant of a [`Change`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Insert,
    Delete,
    Replace,
    Move,
}

impl ChangeKind {
    /// Lowercase name, used in errors and log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
            Self::Move => "move",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of an `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertRef<'a, T> {
    pub index: usize,
    pub item: &'a T,
}

/// Borrowed view of a `Delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRef<'a, T> {
    pub index: usize,
    pub item: &'a T,
}

/// Borrowed view of a `Replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceRef<'a, T> {
    pub index: usize,
    pub old_index: usize,
    pub old_item: &'a T,
    pub new_item: &'a T,
}

/// Borrowed view of a `Move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRef<'a, T> {
    pub from: usize,
    pub to: usize,
    pub item: &'a T,
}

impl<T> Change<T> {
    /// Get the kind of this change.
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Insert { .. } => ChangeKind::Insert,
            Self::Delete { .. } => ChangeKind::Delete,
            Self::Replace { .. } => ChangeKind::Replace,
            Self::Move { .. } => ChangeKind::Move,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace { .. })
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }

    /// `Some` if this is an `Insert`.
    pub fn as_insert(&self) -> Option<InsertRef<'_, T>> {
        match self {
            Self::Insert { index, item } => Some(InsertRef { index: *index, item }),
            _ => None,
        }
    }

    /// `Some` if this is a `Delete`.
    pub fn as_delete(&self) -> Option<DeleteRef<'_, T>> {
        match self {
            Self::Delete { index, item } => Some(DeleteRef { index: *index, item }),
            _ => None,
        }
    }

    /// `Some` if this is a `Replace`.
    pub fn as_replace(&self) -> Option<ReplaceRef<'_, T>> {
        match self {
            Self::Replace {
                index,
                old_index,
                old_item,
                new_item,
            } => Some(ReplaceRef {
                index: *index,
                old_index: *old_index,
                old_item,
                new_item,
            }),
            _ => None,
        }
    }

    /// `Some` if this is a `Move`.
    pub fn as_move(&self) -> Option<MoveRef<'_, T>> {
        match self {
            Self::Move { from, to, item } => Some(MoveRef {
                from: *from,
                to: *to,
                item,
            }),
            _ => None,
        }
    }

    /// Map the payload, keeping positions.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Change<U> {
        match self {
            Self::Insert { index, item } => Change::Insert { index, item: f(item) },
            Self::Delete { index, item } => Change::Delete { index, item: f(item) },
            Self::Replace {
                index,
                old_index,
                old_item,
                new_item,
            } => Change::Replace {
                index,
                old_index,
                old_item: f(old_item),
                new_item: f(new_item),
            },
            Self::Move { from, to, item } => Change::Move { from, to, item: f(item) },
        }
    }
}
