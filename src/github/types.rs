use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// One record from the GitHub events feed, as returned by the REST API.
/// Note: `payload` stays untyped until [`RawEvent::parse_payload`] so that a
/// malformed payload costs one event instead of the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub repo: RepoRef,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub login: String,
}

/// Issue body as embedded in `IssuesEvent` and `IssueCommentEvent`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<Actor>,
    /// Present (with links) when the issue is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<Actor>,
    #[serde(default)]
    pub merged: Option<bool>,
}

/// Comment or review text attached to an event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPayload {
    #[serde(default)]
    pub action: String,
    pub issue: Issue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentPayload {
    #[serde(default)]
    pub action: String,
    pub issue: Issue,
    #[serde(default)]
    pub comment: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: PullRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: PullRequest,
    #[serde(default)]
    pub review: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewCommentPayload {
    #[serde(default)]
    pub action: String,
    pub pull_request: PullRequest,
    #[serde(default)]
    pub comment: Comment,
}

/// Typed view of an event payload.
#[derive(Debug, Clone)]
pub enum EventPayload {
    Issues(IssuesPayload),
    IssueComment(IssueCommentPayload),
    PullRequest(PullRequestPayload),
    PullRequestReview(PullRequestReviewPayload),
    PullRequestReviewComment(PullRequestReviewCommentPayload),
    /// Known event kind with nothing to report (pushes, releases, ...).
    Unreported(String),
    /// Event kind this tool has never heard of.
    Other(String),
}

/// Kinds the feed produces that carry no issue/PR signal.
const UNREPORTED_KINDS: &[&str] = &[
    "CommitCommentEvent",
    "CreateEvent",
    "DeleteEvent",
    "ForkEvent",
    "GollumEvent",
    "MemberEvent",
    "MilestoneEvent",
    "PackageEvent",
    "PublicEvent",
    "PushEvent",
    "ReleaseEvent",
    "RepositoryEvent",
    "RepositoryVulnerabilityAlertEvent",
    "WatchEvent",
];

impl RawEvent {
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    /// Decode the payload according to the event kind.
    pub fn parse_payload(&self) -> Result<EventPayload, serde_json::Error> {
        let payload = match self.kind() {
            "IssuesEvent" => EventPayload::Issues(self.decode()?),
            "IssueCommentEvent" => EventPayload::IssueComment(self.decode()?),
            "PullRequestEvent" => EventPayload::PullRequest(self.decode()?),
            "PullRequestReviewEvent" => EventPayload::PullRequestReview(self.decode()?),
            "PullRequestReviewCommentEvent" => {
                EventPayload::PullRequestReviewComment(self.decode()?)
            }
            kind if UNREPORTED_KINDS.contains(&kind) => EventPayload::Unreported(kind.to_string()),
            kind => EventPayload::Other(kind.to_string()),
        };
        Ok(payload)
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
