//! File-backed persistence for accepted articles and their summary counts.
//!
//! [`BucketStore`] keeps one CSV file per publication day and enforces the
//! deduplication rules on every merge. [`aggregate`] rebuilds the keyword and
//! sector count tables from whatever buckets exist.

pub mod aggregate;
pub mod bucket;
pub mod error;

mod atomic;

pub use aggregate::{recompute, recompute_all, KeywordCount, SectorCount, SkippedBucket, SummaryTables};
pub use bucket::{merge_records, BucketStore, MergeResult};
pub use error::StoreError;
