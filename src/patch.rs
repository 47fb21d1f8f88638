//! Applying an edit script to owned data.
//!
//! Uses the same batch semantics a mutation surface uses, so the result of
//! [`apply_changes`] is what a surface displays after a reconcile:
//!
//! 1. deletes and move sources are taken out by old position
//! 2. inserts and move destinations are placed by new position
//! 3. surviving old elements fill the remaining slots in their old order
//! 4. replaces overwrite by new position

use crate::algo::Change;
use crate::error::{ListDiffError, ListDiffResult};

/// Build the new sequence from `old` and an edit script.
///
/// # Example
///
/// ```
/// use tola_listdiff::{diff, patch::apply_changes};
///
/// let old = vec![1, 2, 3];
/// let new = vec![3, 1, 4];
/// let changes = diff(&old, &new);
/// assert_eq!(apply_changes(&old, &changes).unwrap(), new);
/// ```
pub fn apply_changes<T: Clone>(old: &[T], changes: &[Change<T>]) -> ListDiffResult<Vec<T>> {
    let deletes = changes.iter().filter(|c| c.is_delete()).count();
    let inserts = changes.iter().filter(|c| c.is_insert()).count();
    if deletes > old.len() {
        return Err(ListDiffError::out_of_range("delete", deletes - 1, old.len()));
    }
    let new_len = old.len() - deletes + inserts;

    let mut taken = vec![false; old.len()];
    let mut slots: Vec<Option<T>> = (0..new_len).map(|_| None).collect();

    for change in changes {
        match change {
            Change::Delete { index, .. } => take(&mut taken, "delete", *index)?,
            Change::Insert { index, item } => place(&mut slots, "insert", *index, item.clone())?,
            Change::Move { from, to, .. } => {
                take(&mut taken, "move", *from)?;
                place(&mut slots, "move", *to, old[*from].clone())?;
            }
            Change::Replace { .. } => {}
        }
    }

    let survivors: Vec<T> = old
        .iter()
        .zip(&taken)
        .filter(|(_, taken)| !**taken)
        .map(|(item, _)| item.clone())
        .collect();
    fill(&mut slots, survivors.into_iter())?;

    for change in changes {
        if let Change::Replace { index, new_item, .. } = change {
            let bound = slots.len();
            let slot = slots
                .get_mut(*index)
                .ok_or(ListDiffError::out_of_range("replace", *index, bound))?;
            *slot = Some(new_item.clone());
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Apply an edit script to a live vector.
///
/// On error the vector is left untouched.
pub fn apply_in_place<T: Clone>(live: &mut Vec<T>, changes: &[Change<T>]) -> ListDiffResult<()> {
    *live = apply_changes(live, changes)?;
    Ok(())
}

/// Fill the free slots with surviving elements in order. Every slot must be
/// covered exactly: `found` counts slots placed by the script plus survivors.
fn fill<T>(slots: &mut [Option<T>], survivors: impl ExactSizeIterator<Item = T>) -> ListDiffResult<()> {
    let expected = slots.len();
    let found = slots.iter().filter(|s| s.is_some()).count() + survivors.len();
    if found != expected {
        return Err(ListDiffError::IncompleteScript { expected, found });
    }
    for (slot, item) in slots.iter_mut().filter(|s| s.is_none()).zip(survivors) {
        *slot = Some(item);
    }
    Ok(())
}

fn take(taken: &mut [bool], op: &'static str, index: usize) -> ListDiffResult<()> {
    let bound = taken.len();
    let flag = taken
        .get_mut(index)
        .ok_or(ListDiffError::out_of_range(op, index, bound))?;
    if *flag {
        return Err(ListDiffError::SlotConflict { op, index });
    }
    *flag = true;
    Ok(())
}

fn place<T>(slots: &mut [Option<T>], op: &'static str, index: usize, item: T) -> ListDiffResult<()> {
    let bound = slots.len();
    let slot = slots
        .get_mut(index)
        .ok_or(ListDiffError::out_of_range(op, index, bound))?;
    if slot.is_some() {
        return Err(ListDiffError::SlotConflict { op, index });
    }
    *slot = Some(item);
    Ok(())
}
