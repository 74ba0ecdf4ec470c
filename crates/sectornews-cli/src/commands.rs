//! Command handlers. Each one loads what it needs from `AppConfig` and prints
//! a short human-readable report; structured detail goes to the log.

use anyhow::Context;
use sectornews_core::{load_catalog, AppConfig, KeywordCatalog};
use sectornews_pipeline::{build_feed_client, CollectSummary, PipelineOptions};
use sectornews_store::{BucketStore, SummaryTables};

fn load_catalog_for(config: &AppConfig, sector: Option<&str>) -> anyhow::Result<KeywordCatalog> {
    let catalog = load_catalog(&config.catalog_path).with_context(|| {
        format!(
            "failed to load keyword catalog from {}",
            config.catalog_path.display()
        )
    })?;
    tracing::debug!(
        path = %config.catalog_path.display(),
        keywords = catalog.keyword_count(),
        "loaded keyword catalog"
    );

    match sector {
        Some(name) => Ok(catalog.restricted_to(name)?),
        None => Ok(catalog),
    }
}

fn print_collect_summary(summary: &CollectSummary) {
    println!(
        "collected {} tasks: {} candidates, {} accepted, {} exact duplicates, {} near-duplicates, {} entries skipped",
        summary.tasks,
        summary.fetched,
        summary.accepted(),
        summary.rejected_exact(),
        summary.rejected_similar(),
        summary.skipped_entries,
    );
    for failure in &summary.failures {
        println!(
            "  \u{2717} {}/{}: {}",
            failure.sector, failure.keyword, failure.error
        );
    }
    for outcome in &summary.dates {
        match &outcome.merge {
            Ok(merge) => println!(
                "  \u{2713} {} {:>4} accepted ({} exact, {} similar)",
                outcome.date, merge.accepted, merge.rejected_exact, merge.rejected_similar
            ),
            Err(e) => println!("  \u{2717} {} {e}", outcome.date),
        }
    }
}

fn print_tables(tables: &SummaryTables, config: &AppConfig) {
    println!(
        "wrote {} keyword rows and {} sector rows to {}",
        tables.keyword_counts.len(),
        tables.sector_counts.len(),
        config.summary_dir.display()
    );
    for skipped in &tables.skipped {
        println!("  skipped {}: {}", skipped.path, skipped.reason);
    }
}

/// Fetch and merge, optionally for a single sector.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, `sector` is unknown or
/// has no keywords, or the feed client cannot be built. Per-keyword and
/// per-date failures are reported, not returned.
pub(crate) async fn collect(
    config: &AppConfig,
    sector: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog_for(config, sector)?;

    if dry_run {
        let pairs: Vec<String> = catalog
            .pairs()
            .map(|(sector, keyword)| format!("{sector}/{keyword}"))
            .collect();
        println!(
            "dry-run: would fetch {} keywords: [{}]",
            pairs.len(),
            pairs.join(", ")
        );
        return Ok(());
    }

    let client = build_feed_client(config)?;
    let store = BucketStore::new(config.bucket_dir.clone());
    let summary = sectornews_pipeline::collect(
        &client,
        &catalog,
        &PipelineOptions::from_config(config),
        &store,
    )
    .await;
    print_collect_summary(&summary);
    Ok(())
}

/// Rebuild the summary tables from stored buckets.
///
/// # Errors
///
/// Returns an error if the bucket directory cannot be listed or the tables
/// cannot be written.
pub(crate) fn aggregate(config: &AppConfig) -> anyhow::Result<()> {
    let store = BucketStore::new(config.bucket_dir.clone());
    let tables = sectornews_pipeline::aggregate(&store, &config.summary_dir)?;
    print_tables(&tables, config);
    Ok(())
}

/// Collect everything, then aggregate.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the feed client cannot be
/// built, or the summary tables cannot be written.
pub(crate) async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog_for(config, None)?;
    let client = build_feed_client(config)?;
    let store = BucketStore::new(config.bucket_dir.clone());
    let summary = sectornews_pipeline::run(
        &client,
        &catalog,
        &PipelineOptions::from_config(config),
        &store,
        &config.summary_dir,
    )
    .await?;
    print_collect_summary(&summary.collect);
    print_tables(&summary.tables, config);
    Ok(())
}

/// Print the validated catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or fails validation.
pub(crate) fn catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog_for(config, None)?;
    println!(
        "{} sectors, {} keywords",
        catalog.sectors().count(),
        catalog.keyword_count()
    );
    for sector in catalog.sectors() {
        let keywords = catalog.keywords(sector).unwrap_or_default();
        println!("  {sector}: {}", keywords.join(", "));
    }
    Ok(())
}
