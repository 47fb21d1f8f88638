//! Content-derived identity keys.
//!
//! `StableId` is a ready-made identity key for element types that have no
//! natural numeric key. It is derived from a string (or bytes) with blake3,
//! so the same input yields the same key across process restarts.
//!
//! # Occurrence Index
//!
//! Identities must be unique within one version of a sequence. When the only
//! available key is content that can repeat (e.g. two rows titled "Untitled"),
//! [`StableId::for_occurrence`] mixes in how many times the same key appeared
//! before, so the first "Untitled" keeps its identity when a later one is
//! removed:
//!
//! - `["a", "x", "x"]` → ids `a#0, x#0, x#1`
//! - `["x", "a", "x"]` → ids `x#0, a#0, x#1` (same ids, so a move, not a replace)

use std::fmt;

// =============================================================================
// StableId
// =============================================================================

/// Stable identity key derived from content.
///
/// # Memory Layout
///
/// - 8 bytes (u64)
/// - Copy, no heap allocation
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct StableId(u64);

impl StableId {
    /// Wrap an existing numeric key (database row id, etc).
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 representation.
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Derive a key from bytes.
    ///
    /// Takes the first 8 bytes of the blake3 digest as little-endian u64.
    pub fn of_bytes(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(head))
    }

    /// Derive a key from a string.
    #[inline]
    pub fn of_str(s: &str) -> Self {
        Self::of_bytes(s.as_bytes())
    }

    /// Derive a key from a string and its occurrence index among equal keys.
    pub fn for_occurrence(key: &str, occurrence: usize) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(key.as_bytes());
        hasher.update(b"\0occurrence\0");
        hasher.update(&(occurrence as u64).to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(head))
    }

    /// Assign occurrence-indexed ids to a sequence of possibly repeating keys.
    ///
    /// The result is unique whenever `keys` is finite, which makes it a
    /// safe identity source for the differ.
    pub fn for_sequence<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<StableId> {
        let mut seen: rustc_hash::FxHashMap<&'a str, usize> = rustc_hash::FxHashMap::default();
        keys.into_iter()
            .map(|key| {
                let occurrence = seen.entry(key).or_insert(0);
                let id = Self::for_occurrence(key, *occurrence);
                *occurrence += 1;
                id
            })
            .collect()
    }
}

impl fmt::Debug for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StableId({:016x})", self.0)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl From<u64> for StableId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

// =============================================================================
// Tests
// =============================================================================
