use sectornews_core::DateKey;
use sectornews_store::{MergeResult, SummaryTables};

/// A (sector, keyword) task that produced no candidates because its fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub sector: String,
    pub keyword: String,
    pub error: String,
}

/// Merge result for one date bucket. `merge` holds the error message when
/// the bucket could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMergeOutcome {
    pub date: DateKey,
    pub candidates: usize,
    pub merge: Result<MergeResult, String>,
}

/// What one fetch-and-merge pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    /// Number of (sector, keyword) tasks run.
    pub tasks: usize,
    pub failures: Vec<TaskFailure>,
    /// Candidate articles built across all successful tasks.
    pub fetched: usize,
    /// Feed entries dropped before becoming candidates.
    pub skipped_entries: usize,
    /// One entry per date, ascending.
    pub dates: Vec<DateMergeOutcome>,
}

impl CollectSummary {
    fn merged(&self) -> impl Iterator<Item = &MergeResult> {
        self.dates.iter().filter_map(|d| d.merge.as_ref().ok())
    }

    #[must_use]
    pub fn accepted(&self) -> usize {
        self.merged().map(|m| m.accepted).sum()
    }

    #[must_use]
    pub fn rejected_exact(&self) -> usize {
        self.merged().map(|m| m.rejected_exact).sum()
    }

    #[must_use]
    pub fn rejected_similar(&self) -> usize {
        self.merged().map(|m| m.rejected_similar).sum()
    }

    /// Dates whose bucket could not be written.
    #[must_use]
    pub fn failed_dates(&self) -> Vec<DateKey> {
        self.dates
            .iter()
            .filter(|d| d.merge.is_err())
            .map(|d| d.date)
            .collect()
    }
}

/// Output of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub collect: CollectSummary,
    pub tables: SummaryTables,
}
