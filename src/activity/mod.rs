pub mod aggregator;
pub mod classifier;
pub mod ledger;
pub mod types;

pub use aggregator::Aggregator;
pub use ledger::ActivityLedger;
pub use types::{WorkItem, WorkItemId};

use thiserror::Error;

use crate::github::GitHubError;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Failed to parse {kind} payload: {source}")]
    UnparsablePayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown event type: {0}")]
    UnknownEventKind(String),
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("Invalid owner/repo: {0}")]
    InvalidRepoFilter(String),

    #[error(transparent)]
    Source(#[from] GitHubError),
}

/// Restricts ingestion to one `owner/repo`. Matching ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFilter {
    full_name: String,
}

impl RepoFilter {
    pub fn parse(value: &str) -> Result<Self, ActivityError> {
        let full_name = value.trim().to_ascii_lowercase();
        match full_name.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self { full_name })
            }
            _ => Err(ActivityError::InvalidRepoFilter(value.to_string())),
        }
    }

    pub fn matches(&self, repo_name: &str) -> bool {
        repo_name.eq_ignore_ascii_case(&self.full_name)
    }

    pub fn as_str(&self) -> &str {
        &self.full_name
    }
}
