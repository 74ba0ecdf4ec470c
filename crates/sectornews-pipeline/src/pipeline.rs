//! Entry points tying fetch, merge, and aggregation together.

use std::path::Path;

use sectornews_core::{AppConfig, KeywordCatalog};
use sectornews_feed::{FeedClient, FeedSettings};
use sectornews_store::{recompute_all, BucketStore, SummaryTables};

use crate::error::PipelineError;
use crate::fetch::{fetch_all, group_by_date, FetchOptions, TaskOutcome};
use crate::types::{CollectSummary, DateMergeOutcome, RunSummary, TaskFailure};

/// Tunables for one collect pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub fetch: FetchOptions,
    pub similarity_threshold: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            similarity_threshold: sectornews_core::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fetch: FetchOptions {
                lookback_days: config.lookback_days,
                max_concurrent: config.max_concurrent_fetches,
            },
            similarity_threshold: config.similarity_threshold,
        }
    }
}

/// Builds a [`FeedClient`] from the feed settings in `config`.
///
/// # Errors
///
/// Returns [`PipelineError::Feed`] if the base URL is invalid or the HTTP
/// client cannot be constructed.
pub fn build_feed_client(config: &AppConfig) -> Result<FeedClient, PipelineError> {
    Ok(FeedClient::new(FeedSettings {
        base_url: config.feed_base_url.clone(),
        language: config.feed_language.clone(),
        region: config.feed_region.clone(),
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    })?)
}

/// Fetches every catalog keyword, then merges the candidates into their date
/// buckets one date at a time, in ascending date order.
///
/// Merging starts only after every fetch has finished. Fetch failures and
/// per-date write failures are recorded in the summary rather than returned.
pub async fn collect(
    client: &FeedClient,
    catalog: &KeywordCatalog,
    options: &PipelineOptions,
    store: &BucketStore,
) -> CollectSummary {
    let fetches = fetch_all(client, catalog, &options.fetch).await;

    let mut summary = CollectSummary {
        tasks: fetches.len(),
        ..CollectSummary::default()
    };
    for fetch in &fetches {
        match &fetch.outcome {
            TaskOutcome::Fetched { articles, skipped } => {
                summary.fetched += articles.len();
                summary.skipped_entries += skipped.len();
            }
            TaskOutcome::Failed(error) => summary.failures.push(TaskFailure {
                sector: fetch.sector.clone(),
                keyword: fetch.keyword.clone(),
                error: error.clone(),
            }),
        }
    }
    if !summary.failures.is_empty() {
        tracing::warn!(
            failed = summary.failures.len(),
            tasks = summary.tasks,
            "some keyword fetches failed"
        );
    }

    for (date, candidates) in group_by_date(fetches) {
        let count = candidates.len();
        let merge = store
            .merge(date, candidates, options.similarity_threshold)
            .map_err(|e| {
                tracing::error!(date = %date, error = %e, "failed to persist date bucket");
                e.to_string()
            });
        summary.dates.push(DateMergeOutcome {
            date,
            candidates: count,
            merge,
        });
    }

    tracing::info!(
        tasks = summary.tasks,
        fetched = summary.fetched,
        accepted = summary.accepted(),
        rejected_exact = summary.rejected_exact(),
        rejected_similar = summary.rejected_similar(),
        dates = summary.dates.len(),
        "collect finished"
    );
    summary
}

/// Recomputes the summary tables from every bucket and writes them to
/// `summary_dir`.
///
/// # Errors
///
/// Returns [`PipelineError::Store`] if the bucket directory cannot be listed
/// or either table cannot be written.
pub fn aggregate(store: &BucketStore, summary_dir: &Path) -> Result<SummaryTables, PipelineError> {
    let tables = recompute_all(store)?;
    tables.write(summary_dir)?;
    Ok(tables)
}

/// Runs [`collect`] then [`aggregate`].
///
/// # Errors
///
/// Only summary-table failures are returned; see [`aggregate`].
pub async fn run(
    client: &FeedClient,
    catalog: &KeywordCatalog,
    options: &PipelineOptions,
    store: &BucketStore,
    summary_dir: &Path,
) -> Result<RunSummary, PipelineError> {
    let collected = collect(client, catalog, options, store).await;
    let tables = aggregate(store, summary_dir)?;
    Ok(RunSummary {
        collect: collected,
        tables,
    })
}
