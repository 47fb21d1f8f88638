//! Heckel symbol-table matching for identity-keyed sequences
//!
//! Pairs up positions of `old` and `new` that hold the same identity. The
//! pairing is what the edit script is built from: unpaired old positions are
//! deletes, unpaired new positions are inserts, and paired positions are
//! checked for content changes and reordering.
//!
//! # Passes
//!
//! | Pass | Work |
//! |------|------|
//! | 1 | count occurrences of each identity in `new` |
//! | 2 | count occurrences in `old`, remember old positions |
//! | 3 | pair identities that are unique on both sides |
//! | 4 | extend pairs forward while both neighbours share an identity |
//! | 5 | extend pairs backward, same rule |
//! | 6 | pair remaining repeats left to right |
//!
//! Passes 4 and 5 resolve repeated identities by positional proximity to an
//! already-certain pair. Pass 6 is the deterministic tie-break for whatever is
//! left: the first unpaired new occurrence takes the first unpaired old
//! occurrence of the same identity. With three or more repeats that means
//! pairing is strictly left to right among the leftovers.
//!
//! # Move Detection
//!
//! Pairs are "in order" when they belong to the longest increasing
//! subsequence of old positions read in new order. Every other pair is a
//! move. Taking the longest run keeps the number of moves minimal: `[A, B, C]`
//! → `[A, C, B]` yields one move, not two.
//!
//! # Complexity
//!
//! - Passes 1-6: O(n + m) expected (hash-table driven)
//! - Move detection: O(k log k) for k pairs

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::core::Diffable;

// =============================================================================
// Symbol Table
// =============================================================================

#[derive(Debug, Default)]
struct TableEntry {
    new_count: usize,
    old_count: usize,
    /// Old positions of this identity that may still be unpaired, in order.
    old_positions: VecDeque<usize>,
}

impl TableEntry {
    #[inline]
    fn is_unique_on_both_sides(&self) -> bool {
        self.new_count == 1 && self.old_count == 1
    }
}

/// Per-position state: either still pointing into the symbol table, or
/// paired with a position on the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Table(usize),
    Paired(usize),
}

// =============================================================================
// Matching
// =============================================================================

/// Cross-reference between old and new positions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Matching {
    /// For each new position, the paired old position.
    pub new_to_old: Vec<Option<usize>>,
    /// For each old position, the paired new position.
    pub old_to_new: Vec<Option<usize>>,
}

struct Matcher {
    entries: Vec<TableEntry>,
    old_slots: Vec<Slot>,
    new_slots: Vec<Slot>,
}

impl Matcher {
    fn build<T: Diffable>(old: &[T], new: &[T]) -> Self {
        let mut table: FxHashMap<T::Id, usize> = FxHashMap::default();
        table.reserve(new.len().max(old.len()));
        let mut entries: Vec<TableEntry> = Vec::new();

        let mut lookup = |id: T::Id, entries: &mut Vec<TableEntry>| -> usize {
            *table.entry(id).or_insert_with(|| {
                entries.push(TableEntry::default());
                entries.len() - 1
            })
        };

        // Pass 1
        let mut new_slots = Vec::with_capacity(new.len());
        for item in new {
            let e = lookup(item.identity(), &mut entries);
            entries[e].new_count += 1;
            new_slots.push(Slot::Table(e));
        }

        // Pass 2
        let mut old_slots = Vec::with_capacity(old.len());
        for (index, item) in old.iter().enumerate() {
            let e = lookup(item.identity(), &mut entries);
            entries[e].old_count += 1;
            entries[e].old_positions.push_back(index);
            old_slots.push(Slot::Table(e));
        }

        Self {
            entries,
            old_slots,
            new_slots,
        }
    }

    #[inline]
    fn pair(&mut self, new_index: usize, old_index: usize) {
        self.new_slots[new_index] = Slot::Paired(old_index);
        self.old_slots[old_index] = Slot::Paired(new_index);
    }

    /// Pass 3
    fn pair_unique(&mut self) {
        for new_index in 0..self.new_slots.len() {
            let Slot::Table(e) = self.new_slots[new_index] else {
                continue;
            };
            let entry = &self.entries[e];
            if entry.is_unique_on_both_sides() {
                if let Some(&old_index) = entry.old_positions.front() {
                    self.pair(new_index, old_index);
                }
            }
        }
    }

    /// Pass 4
    fn extend_forward(&mut self) {
        let n = self.new_slots.len();
        for new_index in 0..n.saturating_sub(1) {
            let Slot::Paired(old_index) = self.new_slots[new_index] else {
                continue;
            };
            if old_index + 1 >= self.old_slots.len() {
                continue;
            }
            if let (Slot::Table(a), Slot::Table(b)) =
                (self.new_slots[new_index + 1], self.old_slots[old_index + 1])
            {
                if a == b {
                    self.pair(new_index + 1, old_index + 1);
                }
            }
        }
    }

    /// Pass 5
    fn extend_backward(&mut self) {
        for new_index in (1..self.new_slots.len()).rev() {
            let Slot::Paired(old_index) = self.new_slots[new_index] else {
                continue;
            };
            if old_index == 0 {
                continue;
            }
            if let (Slot::Table(a), Slot::Table(b)) =
                (self.new_slots[new_index - 1], self.old_slots[old_index - 1])
            {
                if a == b {
                    self.pair(new_index - 1, old_index - 1);
                }
            }
        }
    }

    /// Pass 6
    fn pair_leftovers(&mut self) {
        for new_index in 0..self.new_slots.len() {
            let Slot::Table(e) = self.new_slots[new_index] else {
                continue;
            };
            while let Some(old_index) = self.entries[e].old_positions.pop_front() {
                if matches!(self.old_slots[old_index], Slot::Table(_)) {
                    self.pair(new_index, old_index);
                    break;
                }
            }
        }
    }

    fn into_matching(self) -> Matching {
        let unpack = |slot: &Slot| match *slot {
            Slot::Paired(other) => Some(other),
            Slot::Table(_) => None,
        };
        Matching {
            new_to_old: self.new_slots.iter().map(unpack).collect(),
            old_to_new: self.old_slots.iter().map(unpack).collect(),
        }
    }
}

/// Pair positions of `old` and `new` by identity.
pub(crate) fn match_sequences<T: Diffable>(old: &[T], new: &[T]) -> Matching {
    let mut matcher = Matcher::build(old, new);
    matcher.pair_unique();
    matcher.extend_forward();
    matcher.extend_backward();
    matcher.pair_leftovers();
    matcher.into_matching()
}

// =============================================================================
// Duplicate Scan
// =============================================================================

/// An identity seen more than once in one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Repeat<K> {
    pub identity: K,
    pub first_index: usize,
    pub occurrences: usize,
}

/// Identities occurring more than once, ordered by first occurrence.
pub(crate) fn repeated_identities<T: Diffable>(items: &[T]) -> Vec<Repeat<T::Id>> {
    let mut seen: FxHashMap<T::Id, (usize, usize)> = FxHashMap::default();
    for (index, item) in items.iter().enumerate() {
        seen.entry(item.identity()).or_insert((index, 0)).1 += 1;
    }

    let mut repeats: Vec<Repeat<T::Id>> = seen
        .into_iter()
        .filter(|(_, (_, count))| *count > 1)
        .map(|(identity, (first_index, occurrences))| Repeat {
            identity,
            first_index,
            occurrences,
        })
        .collect();
    repeats.sort_unstable_by_key(|r| r.first_index);
    repeats
}

// =============================================================================
// Longest Increasing Subsequence
// =============================================================================

/// Positions (into `seq`) of one longest strictly increasing subsequence.
///
/// Patience sorting with predecessor links. Among equally long runs, the one
/// ending in the smallest tail wins, which makes the choice deterministic.
pub(crate) fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (pos, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[pos] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(pos);
        } else {
            tails[slot] = pos;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(pos) = cursor {
        run.push(pos);
        cursor = prev[pos];
    }
    run.reverse();
    run
}

// =============================================================================
// Tests
// =============================================================================
