use chrono::{DateTime, Utc};

use crate::activity::WorkItemId;
use crate::calendar::RangeKeyword;
use crate::summarize::SummaryStyle;

/// What the report covers.
#[derive(Debug, Clone)]
pub struct ReportScope {
    /// Login whose activity is summarized
    pub tracked_user: String,
    pub range: RangeKeyword,
    /// Resolved start of the range
    pub begin: DateTime<Utc>,
    /// `owner/repo` filter, if any
    pub repo: Option<String>,
    pub style: SummaryStyle,
}

/// Narrative for one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDigest {
    pub id: WorkItemId,
    pub url: String,
    pub title: String,
    pub is_author: bool,
    pub action_count: usize,
    /// Empty when summarization failed
    pub narrative: String,
}

/// Complete report: per-item digests plus the final timecard.
#[derive(Debug)]
pub struct Report {
    pub scope: ReportScope,
    pub issues: Vec<ItemDigest>,
    pub pulls: Vec<ItemDigest>,
    pub timecard: String,
}

impl Report {
    pub fn item_count(&self) -> usize {
        self.issues.len() + self.pulls.len()
    }
}
