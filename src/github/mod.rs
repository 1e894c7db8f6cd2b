pub mod types;

pub use types::{EventPayload, RawEvent};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;

const USER_AGENT: &str = "gh-timecard";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub token not found (set github.token or GITHUB_TOKEN)")]
    MissingToken,

    #[error("No GitHub user to list events for")]
    MissingUser,

    #[error("Failed to decode events: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One page of the events feed, newest first.
#[derive(Debug, Default)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    /// Page number to request next, or None once the feed is exhausted.
    pub next_page: Option<u32>,
    /// Records dropped because their envelope didn't decode.
    pub skipped: usize,
}

/// Decode a JSON array of feed records one record at a time.
///
/// A record with a broken envelope (missing timestamp, null repo, ...) is
/// logged and dropped; only a body that isn't an array at all is an error.
/// Returns the decoded events and the number of records dropped.
pub fn decode_events(body: &str) -> Result<(Vec<RawEvent>, usize), serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let mut events = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        let id = record.get("id").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let kind = record.get("type").and_then(|v| v.as_str()).unwrap_or("").to_string();
        match serde_json::from_value::<RawEvent>(record) {
            Ok(event) => events.push(event),
            Err(err) => {
                warn!(event_id = %id, %kind, error = %err, "ignoring undecodable event");
                skipped += 1;
            }
        }
    }
    Ok((events, skipped))
}

/// Where activity comes from: an identity plus a paginated, newest-first event feed.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Login of the account the credentials belong to.
    async fn authenticated_user(&self) -> Result<String, GitHubError>;

    /// Fetch one page of events. Pages start at 1.
    async fn fetch_page(&self, page: u32) -> Result<EventPage, GitHubError>;
}

/// REST client for the GitHub events API.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    per_page: u32,
    feed_user: Option<String>,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("feed_user", &self.feed_user)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, GitHubError> {
        let token = config.github_token().ok_or(GitHubError::MissingToken)?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_url: config.github.api_url().trim_end_matches('/').to_string(),
            token,
            per_page: config.github.per_page(),
            feed_user: None,
        })
    }

    /// Set whose public activity feed is listed.
    pub fn with_feed_user(mut self, user: impl Into<String>) -> Self {
        self.feed_user = Some(user.into());
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
    }
}

#[async_trait]
impl EventSource for GitHubClient {
    #[instrument(skip(self))]
    async fn authenticated_user(&self) -> Result<String, GitHubError> {
        #[derive(serde::Deserialize)]
        struct UserResponse {
            login: String,
        }

        debug!("fetching authenticated user from GitHub API");
        let user = self
            .get(&format!("{}/user", self.api_url))
            .send()
            .await?
            .error_for_status()?
            .json::<UserResponse>()
            .await?;
        debug!(login = %user.login, "resolved identity");
        Ok(user.login)
    }

    #[instrument(skip(self), fields(user = ?self.feed_user))]
    async fn fetch_page(&self, page: u32) -> Result<EventPage, GitHubError> {
        let user = self.feed_user.as_deref().ok_or(GitHubError::MissingUser)?;
        let url = format!("{}/users/{}/events", self.api_url, user);

        let response = self
            .get(&url)
            .query(&[("per_page", self.per_page), ("page", page)])
            .send()
            .await?
            .error_for_status()?;

        let next_page = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_from_link);

        let body = response.text().await?;
        let (events, skipped) = decode_events(&body)?;
        debug!(events = events.len(), skipped, ?next_page, "received events page");

        Ok(EventPage {
            events,
            next_page,
            skipped,
        })
    }
}

/// Extract the `page` query parameter of the `rel="next"` entry of a Link header.
pub fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"next\"") {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = reqwest::Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

/// Serves a captured events feed from memory as a single page.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    login: String,
    events: Vec<RawEvent>,
    skipped: usize,
}

impl FixtureSource {
    pub fn new(login: impl Into<String>, events: Vec<RawEvent>) -> Self {
        Self {
            login: login.into(),
            events,
            skipped: 0,
        }
    }

    /// Parse a JSON array in the shape returned by the events API.
    /// Undecodable records are dropped the same way a live page drops them.
    pub fn from_json(login: impl Into<String>, json: &str) -> Result<Self, GitHubError> {
        let (events, skipped) = decode_events(json)?;
        Ok(Self {
            skipped,
            ..Self::new(login, events)
        })
    }

    /// Shift every timestamp so the newest event happened at `now`.
    pub fn rebased_to(mut self, now: DateTime<Utc>) -> Self {
        if let Some(newest) = self.events.iter().map(|e| e.created_at).max() {
            let shift = now - newest;
            for event in &mut self.events {
                event.created_at += shift;
            }
        }
        self
    }
}

#[async_trait]
impl EventSource for FixtureSource {
    async fn authenticated_user(&self) -> Result<String, GitHubError> {
        Ok(self.login.clone())
    }

    async fn fetch_page(&self, page: u32) -> Result<EventPage, GitHubError> {
        if page > 1 {
            return Ok(EventPage::default());
        }
        Ok(EventPage {
            events: self.events.clone(),
            next_page: None,
            skipped: self.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_from_link() {
        let link = "<https://api.github.com/user/42/events?per_page=100&page=2>; rel=\"next\", \
                    <https://api.github.com/user/42/events?per_page=100&page=3>; rel=\"last\"";
        assert_eq!(next_page_from_link(link), Some(2));
    }

    #[test]
    fn test_next_page_from_link_on_last_page() {
        let link = "<https://api.github.com/user/42/events?per_page=100&page=1>; rel=\"first\", \
                    <https://api.github.com/user/42/events?per_page=100&page=2>; rel=\"prev\"";
        assert_eq!(next_page_from_link(link), None);
        assert_eq!(next_page_from_link(""), None);
    }

    #[test]
    fn test_client_accepts_configured_token() {
        let mut config = Config::default();
        config.github.token = Some("ghp_test".to_string());
        assert!(GitHubClient::new(&config).is_ok());
    }

    #[test]
    fn test_client_debug_redacts_token() {
        let mut config = Config::default();
        config.github.token = Some("ghp_supersecret".to_string());
        let client = GitHubClient::new(&config).unwrap().with_feed_user("alice");
        let debug = format!("{client:?}");
        assert!(!debug.contains("ghp_supersecret"));
        assert!(debug.contains("alice"));
    }

    #[tokio::test]
    async fn test_fixture_source_serves_one_page() {
        let json = r#"[{"id":"1","type":"PushEvent","created_at":"2025-01-29T10:00:00Z","repo":{"name":"org/repo"},"payload":{}}]"#;
        let source = FixtureSource::from_json("alice", json).unwrap();
        assert_eq!(source.authenticated_user().await.unwrap(), "alice");

        let first = source.fetch_page(1).await.unwrap();
        assert_eq!(first.events.len(), 1);
        assert_eq!(first.next_page, None);
        assert!(source.fetch_page(2).await.unwrap().events.is_empty());
    }

    #[test]
    fn test_fixture_source_rebase_keeps_spacing() {
        let json = r#"[
            {"id":"2","type":"PushEvent","created_at":"2025-01-29T10:00:00Z","repo":{"name":"org/repo"},"payload":{}},
            {"id":"1","type":"PushEvent","created_at":"2025-01-28T10:00:00Z","repo":{"name":"org/repo"},"payload":{}}
        ]"#;
        let now: DateTime<Utc> = "2026-10-18T12:00:00Z".parse().unwrap();
        let source = FixtureSource::from_json("alice", json).unwrap().rebased_to(now);
        assert_eq!(source.events[0].created_at, now);
        assert_eq!(source.events[0].created_at - source.events[1].created_at, chrono::Duration::days(1));
    }

    #[test]
    fn test_decode_events_drops_broken_records() {
        let body = r#"[
            {"id":"3","type":"PushEvent","created_at":"2025-01-29T12:00:00Z","repo":{"name":"org/repo"},"payload":{}},
            {"id":"2","type":"IssuesEvent","created_at":"2025-01-29T11:00:00Z","repo":null,"payload":{}},
            {"id":"1","type":"PushEvent","created_at":"2025-01-29T10:00:00Z","repo":{"name":"org/repo"},"payload":{}}
        ]"#;
        let (events, skipped) = decode_events(body).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["3", "1"]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_decode_events_requires_an_array() {
        assert!(decode_events(r#"{"message":"Not Found"}"#).is_err());
        assert_eq!(decode_events("[]").unwrap().1, 0);
    }

    #[tokio::test]
    async fn test_fixture_source_reports_dropped_records() {
        let json = r#"[
            {"id":"2","type":"PushEvent","created_at":"2025-01-29T10:00:00Z","repo":{"name":"org/repo"},"payload":{}},
            {"id":"1","type":"PushEvent","repo":{"name":"org/repo"},"payload":{}}
        ]"#;
        let source = FixtureSource::from_json("alice", json).unwrap();
        let page = source.fetch_page(1).await.unwrap();
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_fixture_source_rejects_bad_json() {
        assert!(matches!(
            FixtureSource::from_json("alice", "{not json"),
            Err(GitHubError::Decode(_))
        ));
    }
}
