//! Fetch, deduplicate, persist, and aggregate.
//!
//! The fetch phase runs concurrently over every (sector, keyword) pair; once
//! it has completed, candidates are regrouped by publication day and merged
//! into their date buckets sequentially, and the summary tables are rebuilt
//! from all buckets.

pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod types;

pub use error::PipelineError;
pub use fetch::{
    build_article, build_articles, fetch_all, group_by_date, EntrySkip, FetchOptions,
    KeywordFetch, TaskOutcome,
};
pub use pipeline::{aggregate, build_feed_client, collect, run, PipelineOptions};
pub use types::{CollectSummary, DateMergeOutcome, RunSummary, TaskFailure};
