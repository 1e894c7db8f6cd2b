use tracing::{debug, warn};

use super::types::{ActionRecord, EventObject, WorkItem, WorkItemId, WorkItemKind};
use super::ClassifyError;
use crate::github::types::{Actor, Issue, PullRequest};
use crate::github::{EventPayload, RawEvent};

/// Result of classifying one event.
/// Bodies are carried verbatim; condensing them is the ingest loop's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    WorkItem { item: WorkItem, action: ActionRecord },
    Ignored,
}

/// Classify an event, logging and absorbing anything that can't be classified.
pub fn classify(event: &RawEvent, tracked_user: &str) -> Outcome {
    match try_classify(event, tracked_user) {
        Ok(Some((item, action))) => Outcome::WorkItem { item, action },
        Ok(None) => Outcome::Ignored,
        Err(err) => {
            warn!(event_id = %event.id, kind = event.kind(), error = %err, "ignoring event");
            Outcome::Ignored
        }
    }
}

/// Map an event to the work item it touches and the action it represents.
/// Returns Ok(None) for known kinds that carry no issue/PR signal.
pub fn try_classify(
    event: &RawEvent,
    tracked_user: &str,
) -> Result<Option<(WorkItem, ActionRecord)>, ClassifyError> {
    let payload = event
        .parse_payload()
        .map_err(|source| ClassifyError::UnparsablePayload {
            kind: event.kind().to_string(),
            source,
        })?;

    let classified = match payload {
        EventPayload::Issues(p) => {
            let content = body_of(&p.issue.body);
            (from_issue(&p.issue, tracked_user), action(p.action, EventObject::Issue, content))
        }
        EventPayload::IssueComment(p) => (
            from_issue(&p.issue, tracked_user),
            action(p.action, EventObject::IssueComment, body_of(&p.comment.body)),
        ),
        EventPayload::PullRequest(p) => {
            let verb = pull_request_verb(p.action, &p.pull_request);
            let content = body_of(&p.pull_request.body);
            (
                from_pull_request(&p.pull_request, tracked_user),
                action(verb, EventObject::PullRequest, content),
            )
        }
        EventPayload::PullRequestReview(p) => (
            from_pull_request(&p.pull_request, tracked_user),
            action(p.action, EventObject::PullRequestComment, body_of(&p.review.body)),
        ),
        EventPayload::PullRequestReviewComment(p) => (
            from_pull_request(&p.pull_request, tracked_user),
            action(p.action, EventObject::PullRequestComment, body_of(&p.comment.body)),
        ),
        EventPayload::Unreported(kind) => {
            debug!(event_id = %event.id, %kind, "event has nothing to report");
            return Ok(None);
        }
        EventPayload::Other(kind) => return Err(ClassifyError::UnknownEventKind(kind)),
    };
    Ok(Some(classified))
}

/// The feed reports a merge as "closed" plus a merged flag; fold that into one verb.
fn pull_request_verb(action: String, pull: &PullRequest) -> String {
    if action == "closed" && pull.merged.unwrap_or(false) {
        return "merged".to_string();
    }
    action
}

fn from_issue(issue: &Issue, tracked_user: &str) -> WorkItem {
    let kind = if issue.is_pull_request() {
        WorkItemKind::PullRequest
    } else {
        WorkItemKind::Issue
    };
    WorkItem {
        id: WorkItemId(issue.number),
        kind,
        url: issue.html_url.clone(),
        title: issue.title.clone(),
        description: body_of(&issue.body),
        is_author: is_tracked(issue.user.as_ref(), tracked_user),
    }
}

fn from_pull_request(pull: &PullRequest, tracked_user: &str) -> WorkItem {
    WorkItem {
        id: WorkItemId(pull.number),
        kind: WorkItemKind::PullRequest,
        url: pull.html_url.clone(),
        title: pull.title.clone(),
        description: body_of(&pull.body),
        is_author: is_tracked(pull.user.as_ref(), tracked_user),
    }
}

/// GitHub logins are case-insensitive.
fn is_tracked(user: Option<&Actor>, tracked_user: &str) -> bool {
    user.is_some_and(|u| !u.login.is_empty() && u.login.eq_ignore_ascii_case(tracked_user))
}

fn body_of(body: &Option<String>) -> String {
    body.clone().unwrap_or_default()
}

fn action(verb: String, object: EventObject, content: String) -> ActionRecord {
    ActionRecord {
        action: verb,
        object,
        content,
    }
}
