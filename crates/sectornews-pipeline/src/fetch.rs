//! Concurrent per-keyword feed retrieval and candidate construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use sectornews_core::{extract_anchor_text, ArticleRecord, DateKey, KeywordCatalog};
use sectornews_feed::{parse_published, FeedClient, FeedEntry};

/// Fetch window and worker-pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub lookback_days: u32,
    pub max_concurrent: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            max_concurrent: 5,
        }
    }
}

/// Why a feed entry did not become a candidate article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySkip {
    MissingLink,
    MissingPublished,
    UnparseablePublished,
    OutsideLookback,
}

impl EntrySkip {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingLink => "missing link",
            Self::MissingPublished => "missing publish date",
            Self::UnparseablePublished => "unparseable publish date",
            Self::OutsideLookback => "outside lookback window",
        }
    }
}

/// Result of one (sector, keyword) task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Fetched {
        articles: Vec<ArticleRecord>,
        skipped: Vec<EntrySkip>,
    },
    /// The request or feed parse failed; carries the error message.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct KeywordFetch {
    pub sector: String,
    pub keyword: String,
    pub outcome: TaskOutcome,
}

/// Turns one feed entry into a candidate article.
///
/// `link` and a parseable `pubDate` at or after `now - lookback` are required.
/// Missing title, description, or source fall back to empty strings. The
/// description keeps only its first hyperlink's text.
///
/// # Errors
///
/// Returns the [`EntrySkip`] reason when the entry cannot be used.
pub fn build_article(
    entry: FeedEntry,
    sector: &str,
    keyword: &str,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<ArticleRecord, EntrySkip> {
    let url = entry.link.ok_or(EntrySkip::MissingLink)?;
    let raw_published = entry.pub_date.ok_or(EntrySkip::MissingPublished)?;
    let published = parse_published(&raw_published).ok_or(EntrySkip::UnparseablePublished)?;
    // A window reaching past the representable range has no lower bound.
    if now
        .checked_sub_signed(lookback)
        .is_some_and(|cutoff| published < cutoff)
    {
        return Err(EntrySkip::OutsideLookback);
    }

    Ok(ArticleRecord {
        date: DateKey::from_datetime(&published),
        sector: sector.to_string(),
        keyword: keyword.to_string(),
        media: entry.source.unwrap_or_default(),
        title: entry.title.unwrap_or_default(),
        description: extract_anchor_text(entry.description.as_deref().unwrap_or_default()),
        url,
        published: published.date_naive(),
        scraped_at: now,
    })
}

/// Builds candidates for every usable entry, collecting skip reasons for the rest.
#[must_use]
pub fn build_articles(
    entries: Vec<FeedEntry>,
    sector: &str,
    keyword: &str,
    now: DateTime<Utc>,
    lookback_days: u32,
) -> (Vec<ArticleRecord>, Vec<EntrySkip>) {
    let lookback = Duration::days(i64::from(lookback_days));
    let mut articles = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        match build_article(entry, sector, keyword, now, lookback) {
            Ok(article) => articles.push(article),
            Err(reason) => {
                tracing::debug!(sector, keyword, reason = reason.as_str(), "skipping feed entry");
                skipped.push(reason);
            }
        }
    }
    (articles, skipped)
}

async fn fetch_keyword(
    client: &FeedClient,
    sector: &str,
    keyword: &str,
    now: DateTime<Utc>,
    lookback_days: u32,
) -> KeywordFetch {
    let outcome = match client.fetch_entries(keyword).await {
        Ok(entries) => {
            let (articles, skipped) = build_articles(entries, sector, keyword, now, lookback_days);
            tracing::info!(
                sector,
                keyword,
                fetched = articles.len(),
                skipped = skipped.len(),
                "fetched keyword feed"
            );
            TaskOutcome::Fetched { articles, skipped }
        }
        Err(e) => {
            tracing::warn!(sector, keyword, error = %e, "keyword fetch failed");
            TaskOutcome::Failed(e.to_string())
        }
    };

    KeywordFetch {
        sector: sector.to_string(),
        keyword: keyword.to_string(),
        outcome,
    }
}

/// Fetches every (sector, keyword) pair in `catalog` with at most
/// `options.max_concurrent` requests in flight.
///
/// Returns once every task has finished, in completion order. A failing task
/// never cancels or affects its siblings.
pub async fn fetch_all(
    client: &FeedClient,
    catalog: &KeywordCatalog,
    options: &FetchOptions,
) -> Vec<KeywordFetch> {
    let now = Utc::now();
    let lookback_days = options.lookback_days;

    stream::iter(catalog.pairs())
        .map(|(sector, keyword)| fetch_keyword(client, sector, keyword, now, lookback_days))
        .buffer_unordered(options.max_concurrent.max(1))
        .collect()
        .await
}

/// Regroups successful task output by publication day, keeping task order
/// and feed order within each day.
#[must_use]
pub fn group_by_date<I>(fetches: I) -> BTreeMap<DateKey, Vec<ArticleRecord>>
where
    I: IntoIterator<Item = KeywordFetch>,
{
    let mut by_date: BTreeMap<DateKey, Vec<ArticleRecord>> = BTreeMap::new();
    for fetch in fetches {
        if let TaskOutcome::Fetched { articles, .. } = fetch.outcome {
            for article in articles {
                by_date.entry(article.date).or_default().push(article);
            }
        }
    }
    by_date
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
