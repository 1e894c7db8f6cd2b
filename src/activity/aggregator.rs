use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::classifier::{classify, Outcome};
use super::ledger::ActivityLedger;
use super::{ActivityError, RepoFilter};
use crate::github::{EventSource, RawEvent};
use crate::summarize::{condense, Summarizer};

/// Whether the feed should keep being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// An event older than the begin instant was seen.
    Stop,
}

/// Counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub pages: usize,
    /// Events inside the date range, including filtered ones
    pub seen: usize,
    /// Events skipped by the repository filter
    pub filtered: usize,
    pub classified: usize,
    /// Unclassifiable events plus records the source couldn't decode
    pub ignored: usize,
}

/// Feeds events into a ledger, condensing their text on the way in.
///
/// Events must arrive newest first; the first one created before `begin`
/// ends the run. The ledger has a single writer for its whole lifetime.
pub struct Aggregator<'a, S: Summarizer + ?Sized> {
    summarizer: &'a S,
    ledger: ActivityLedger,
    begin: DateTime<Utc>,
    repo_filter: Option<RepoFilter>,
    stats: IngestStats,
}

impl<'a, S: Summarizer + ?Sized> Aggregator<'a, S> {
    pub fn new(
        summarizer: &'a S,
        tracked_user: impl Into<String>,
        begin: DateTime<Utc>,
        repo_filter: Option<RepoFilter>,
    ) -> Self {
        Self {
            summarizer,
            ledger: ActivityLedger::new(tracked_user),
            begin,
            repo_filter,
            stats: IngestStats::default(),
        }
    }

    /// Ingest one event.
    pub async fn ingest(&mut self, event: &RawEvent) -> Flow {
        if event.created_at < self.begin {
            debug!(event_id = %event.id, created_at = %event.created_at, "reached begin of range");
            return Flow::Stop;
        }
        self.stats.seen += 1;

        if let Some(filter) = &self.repo_filter {
            if !filter.matches(&event.repo.name) {
                self.stats.filtered += 1;
                return Flow::Continue;
            }
        }

        let Outcome::WorkItem { mut item, mut action } = classify(event, self.ledger.tracked_user()) else {
            self.stats.ignored += 1;
            return Flow::Continue;
        };

        // Known items keep their first description, so only new ones are condensed.
        if self.ledger.lookup(item.id).is_none() {
            let raw_description = std::mem::take(&mut item.description);
            item.description = condense(self.summarizer, &raw_description).await;
            if action.content == raw_description {
                action.content = item.description.clone();
            } else {
                action.content = condense(self.summarizer, &action.content).await;
            }
        } else {
            action.content = condense(self.summarizer, &action.content).await;
        }

        debug!(id = %item.id, kind = ?item.kind, action = %action.action, object = %action.object, "recorded action");
        self.ledger.record(item, action);
        self.stats.classified += 1;
        Flow::Continue
    }

    /// Ingest a page in order, stopping at the begin instant.
    pub async fn ingest_page(&mut self, events: &[RawEvent]) -> Flow {
        for event in events {
            if self.ingest(event).await == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Read the whole feed from `source` (page by page) and return the filled ledger.
    /// Source errors abort the run.
    #[instrument(skip_all, fields(begin = %self.begin))]
    pub async fn run<E: EventSource + ?Sized>(
        mut self,
        source: &E,
    ) -> Result<(ActivityLedger, IngestStats), ActivityError> {
        let mut page = 1;
        loop {
            info!(page, "fetching events");
            let fetched = source.fetch_page(page).await?;
            self.stats.pages += 1;
            self.stats.ignored += fetched.skipped;

            if self.ingest_page(&fetched.events).await == Flow::Stop {
                break;
            }
            match fetched.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        let stats = self.stats;
        info!(
            pages = stats.pages,
            seen = stats.seen,
            filtered = stats.filtered,
            classified = stats.classified,
            ignored = stats.ignored,
            work_items = self.ledger.len(),
            "ingest complete"
        );
        Ok((self.ledger, stats))
    }
}
