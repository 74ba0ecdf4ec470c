//! Keyword- and sector-level count tables rebuilt from the date buckets.

use std::collections::BTreeMap;
use std::path::Path;

use sectornews_core::{ArticleRecord, DateKey};
use serde::Serialize;

use crate::atomic::write_csv;
use crate::bucket::{read_bucket, BucketStore};
use crate::error::StoreError;

pub const KEYWORD_TABLE: &str = "keyword.csv";
pub const SECTOR_TABLE: &str = "sector.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub date: DateKey,
    pub sector: String,
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorCount {
    pub date: DateKey,
    pub sector: String,
    pub count: usize,
}

/// A bucket left out of the tables because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBucket {
    pub date: DateKey,
    pub path: String,
    pub reason: String,
}

/// Both count tables, ordered by date, sector, then keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTables {
    pub keyword_counts: Vec<KeywordCount>,
    pub sector_counts: Vec<SectorCount>,
    pub skipped: Vec<SkippedBucket>,
}

impl SummaryTables {
    /// Adds the rows for one bucket.
    pub fn add_bucket(&mut self, date: DateKey, records: &[ArticleRecord]) {
        let mut by_keyword: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        let mut by_sector: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *by_keyword
                .entry((record.sector.as_str(), record.keyword.as_str()))
                .or_default() += 1;
            *by_sector.entry(record.sector.as_str()).or_default() += 1;
        }

        self.keyword_counts
            .extend(by_keyword.into_iter().map(|((sector, keyword), count)| KeywordCount {
                date,
                sector: sector.to_string(),
                keyword: keyword.to_string(),
                count,
            }));
        self.sector_counts
            .extend(by_sector.into_iter().map(|(sector, count)| SectorCount {
                date,
                sector: sector.to_string(),
                count,
            }));
    }

    /// Writes `keyword.csv` and `sector.csv` under `summary_dir`, replacing
    /// previous contents. Empty tables still get their header row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either file cannot be written.
    pub fn write(&self, summary_dir: &Path) -> Result<(), StoreError> {
        write_csv(
            &summary_dir.join(KEYWORD_TABLE),
            &["date", "sector", "keyword", "count"],
            &self.keyword_counts,
        )?;
        write_csv(
            &summary_dir.join(SECTOR_TABLE),
            &["date", "sector", "count"],
            &self.sector_counts,
        )
    }
}

/// Recomputes both tables from the buckets for `dates`.
///
/// Dates are processed in ascending order regardless of input order. A bucket
/// that cannot be read is recorded in [`SummaryTables::skipped`] and the
/// remaining buckets are still counted.
#[must_use]
pub fn recompute(store: &BucketStore, dates: &[DateKey]) -> SummaryTables {
    let mut dates = dates.to_vec();
    dates.sort_unstable();
    dates.dedup();

    let mut tables = SummaryTables::default();
    for date in dates {
        let path = store.path_for(date);
        match read_bucket(&path) {
            Ok(records) => tables.add_bucket(date, &records),
            Err(e) => {
                tracing::warn!(
                    date = %date,
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable date bucket"
                );
                tables.skipped.push(SkippedBucket {
                    date,
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    tables
}

/// Recomputes both tables from every bucket in `store`.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the bucket directory cannot be listed.
pub fn recompute_all(store: &BucketStore) -> Result<SummaryTables, StoreError> {
    let dates = store.list_dates()?;
    let tables = recompute(store, &dates);
    tracing::info!(
        buckets = dates.len(),
        skipped = tables.skipped.len(),
        keyword_rows = tables.keyword_counts.len(),
        sector_rows = tables.sector_counts.len(),
        "recomputed summary tables"
    );
    Ok(tables)
}
