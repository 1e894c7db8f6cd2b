use std::fmt;

/// Issue or pull request number. Issues and pulls share one counter per
/// repository, so a number never names both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItemId(pub u64);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemKind {
    Issue,
    PullRequest,
}

/// An issue or pull request the tracked user touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub kind: WorkItemKind,
    pub url: String,
    pub title: String,
    /// Condensed body text
    pub description: String,
    /// Whether the tracked user opened it
    pub is_author: bool,
}

/// What an action was performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventObject {
    Issue,
    IssueComment,
    PullRequest,
    PullRequestComment,
}

impl fmt::Display for EventObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventObject::Issue => write!(f, "issue"),
            EventObject::IssueComment => write!(f, "issue comment"),
            EventObject::PullRequest => write!(f, "pull request"),
            EventObject::PullRequestComment => write!(f, "pull request comment"),
        }
    }
}

/// One observed activity against a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Normalized verb ("opened", "closed", "merged", "created", ...)
    pub action: String,
    pub object: EventObject,
    /// Condensed body text of the action
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_object_display() {
        assert_eq!(EventObject::Issue.to_string(), "issue");
        assert_eq!(EventObject::IssueComment.to_string(), "issue comment");
        assert_eq!(EventObject::PullRequest.to_string(), "pull request");
        assert_eq!(EventObject::PullRequestComment.to_string(), "pull request comment");
    }

    #[test]
    fn test_work_item_id_ordering() {
        assert!(WorkItemId(2) < WorkItemId(10));
        assert_eq!(WorkItemId(42).to_string(), "42");
    }
}
