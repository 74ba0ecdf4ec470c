//! Per-day CSV buckets and the deduplicating merge.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sectornews_core::{clean_text, is_duplicate, ArticleRecord, DateKey};

use crate::atomic::write_csv;
use crate::error::StoreError;

pub(crate) const BUCKET_HEADER: [&str; 9] = [
    "date",
    "sector",
    "keyword",
    "media",
    "title",
    "description",
    "url",
    "published",
    "scraped_at",
];

const MAX_LOGGED_SAMPLES: usize = 3;

/// Counts produced by one [`BucketStore::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub accepted: usize,
    pub rejected_exact: usize,
    pub rejected_similar: usize,
}

impl MergeResult {
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected_exact + self.rejected_similar
    }
}

/// Directory of `YYYYMMDD.csv` buckets.
#[derive(Debug, Clone)]
pub struct BucketStore {
    dir: PathBuf,
}

impl BucketStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, date: DateKey) -> PathBuf {
        self.dir.join(format!("{date}.csv"))
    }

    /// Reads the bucket for `date`. A bucket that does not exist yet is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or any row
    /// fails to deserialize.
    pub fn load(&self, date: DateKey) -> Result<Vec<ArticleRecord>, StoreError> {
        read_bucket(&self.path_for(date))
    }

    /// Replaces the bucket for `date` with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory or file cannot be written.
    pub fn save(&self, date: DateKey, records: &[ArticleRecord]) -> Result<(), StoreError> {
        write_csv(&self.path_for(date), &BUCKET_HEADER, records)
    }

    /// Every date that has a bucket file, ascending.
    ///
    /// Files whose stem is not a valid `YYYYMMDD` date are ignored. A missing
    /// directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory exists but cannot be listed.
    pub fn list_dates(&self) -> Result<Vec<DateKey>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                continue;
            }
            if let Some(date) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<DateKey>().ok())
            {
                dates.push(date);
            }
        }
        dates.sort_unstable();
        Ok(dates)
    }

    /// Merges `candidates` into the bucket for `date` and persists the result.
    ///
    /// The bucket is rewritten only when at least one candidate is accepted.
    /// A bucket that cannot be read is renamed to `YYYYMMDD.csv.corrupt` (or
    /// the first free `YYYYMMDD.csv.corrupt.N` when earlier quarantined copies
    /// exist) and the merge proceeds against an empty prior state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if an unreadable bucket cannot be moved aside or
    /// the updated bucket cannot be written.
    pub fn merge(
        &self,
        date: DateKey,
        candidates: Vec<ArticleRecord>,
        threshold: f64,
    ) -> Result<MergeResult, StoreError> {
        let mut records = match self.load(date) {
            Ok(records) => records,
            Err(e) => {
                self.quarantine(date, &e)?;
                Vec::new()
            }
        };

        let result = merge_records(&mut records, candidates, threshold);
        tracing::info!(
            date = %date,
            accepted = result.accepted,
            rejected_exact = result.rejected_exact,
            rejected_similar = result.rejected_similar,
            total = records.len(),
            "merged date bucket"
        );

        if result.accepted > 0 {
            self.save(date, &records)?;
        }
        Ok(result)
    }

    fn quarantine(&self, date: DateKey, cause: &StoreError) -> Result<(), StoreError> {
        let path = self.path_for(date);
        let aside = self.quarantine_path(date);
        tracing::warn!(
            date = %date,
            path = %path.display(),
            aside = %aside.display(),
            error = %cause,
            "unreadable date bucket; moving aside and starting empty"
        );
        fs::rename(&path, &aside).map_err(|e| StoreError::io(&path, e))
    }

    /// First free name among `YYYYMMDD.csv.corrupt`, `YYYYMMDD.csv.corrupt.1`, ...
    fn quarantine_path(&self, date: DateKey) -> PathBuf {
        let first = self.dir.join(format!("{date}.csv.corrupt"));
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.dir.join(format!("{date}.csv.corrupt.{n}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

pub(crate) fn read_bucket(path: &Path) -> Result<Vec<ArticleRecord>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    csv::Reader::from_reader(file)
        .deserialize()
        .collect::<Result<Vec<ArticleRecord>, _>>()
        .map_err(|e| StoreError::csv(path, e))
}

/// Appends the acceptable `candidates` to `records`, in order.
///
/// A candidate is rejected as exact when its URL is already in `records`
/// (including records accepted earlier in this call), and as similar when its
/// normalized description is a near-duplicate of one already accepted under
/// the same (sector, keyword). Similarity never crosses keyword scopes.
pub fn merge_records(
    records: &mut Vec<ArticleRecord>,
    candidates: Vec<ArticleRecord>,
    threshold: f64,
) -> MergeResult {
    let mut urls: HashSet<String> = records.iter().map(|r| r.url.clone()).collect();
    let mut descriptions: HashMap<(String, String), Vec<String>> = HashMap::new();
    for record in records.iter() {
        descriptions
            .entry(record.scope_key())
            .or_default()
            .push(clean_text(&record.description));
    }

    let mut result = MergeResult::default();
    let mut samples: Vec<String> = Vec::new();

    for candidate in candidates {
        if urls.contains(&candidate.url) {
            result.rejected_exact += 1;
            continue;
        }

        let scope = descriptions.entry(candidate.scope_key()).or_default();
        if is_duplicate(
            &candidate.description,
            scope.iter().map(String::as_str),
            threshold,
        ) {
            result.rejected_similar += 1;
            if samples.len() < MAX_LOGGED_SAMPLES {
                samples.push(candidate.description);
            }
            continue;
        }

        urls.insert(candidate.url.clone());
        scope.push(clean_text(&candidate.description));
        records.push(candidate);
        result.accepted += 1;
    }

    for description in &samples {
        tracing::debug!(description = %description, "rejected near-duplicate");
    }
    result
}

#[cfg(test)]
#[path = "bucket_test.rs"]
mod tests;
