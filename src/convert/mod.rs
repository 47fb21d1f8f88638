//! Edit script → position translation
//!
//! Turns `Change` lists into per-kind position buckets a mutation surface
//! understands. Pure functions; out-of-range positions are not detected here
//! but by the reconciler's pre-flight check.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | flat item changes + section | [`convert()`] | [`ItemBuckets`] |
//! | section changes | [`convert_section_changes()`] | [`SectionBuckets`] |
//! | [`SectionDiff`](crate::SectionDiff) | [`convert_sections()`] | [`SectionPlan`] |

mod buckets;
mod index_path;
mod plan;

pub use buckets::{convert, convert_section_changes, ChangeBuckets, ItemBuckets, SectionBuckets};
pub use index_path::{IndexPath, Position};
pub use plan::{convert_sections, NestedBuckets, SectionPlan};
