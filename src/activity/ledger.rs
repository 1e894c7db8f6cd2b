use std::collections::HashMap;

use super::types::{ActionRecord, WorkItem, WorkItemId, WorkItemKind};

/// Work items seen during one run and the actions taken on each, in arrival order.
///
/// Items live in a single id-keyed map tagged with their kind, so an id can
/// never be both an issue and a pull. The first sighting of an id wins:
/// later events append actions but never rewrite the item.
#[derive(Debug, Clone)]
pub struct ActivityLedger {
    tracked_user: String,
    items: HashMap<WorkItemId, WorkItem>,
    actions: HashMap<WorkItemId, Vec<ActionRecord>>,
}

impl ActivityLedger {
    pub fn new(tracked_user: impl Into<String>) -> Self {
        Self {
            tracked_user: tracked_user.into(),
            items: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    pub fn tracked_user(&self) -> &str {
        &self.tracked_user
    }

    /// Insert `item` unless its id is already known. Returns true if inserted.
    pub fn upsert_work_item(&mut self, item: WorkItem) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id, item);
        true
    }

    /// Append to the timeline of `id`. The id is not checked against known items.
    pub fn append_action(&mut self, id: WorkItemId, action: ActionRecord) {
        self.actions.entry(id).or_default().push(action);
    }

    /// Upsert the item, then append the action to its timeline.
    pub fn record(&mut self, item: WorkItem, action: ActionRecord) -> bool {
        let id = item.id;
        let inserted = self.upsert_work_item(item);
        self.append_action(id, action);
        inserted
    }

    pub fn lookup(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.items.get(&id)
    }

    /// Timeline of `id`; empty if nothing was recorded.
    pub fn actions(&self, id: WorkItemId) -> &[ActionRecord] {
        self.actions.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Issues in no particular order.
    pub fn issues(&self) -> impl Iterator<Item = &WorkItem> {
        self.of_kind(WorkItemKind::Issue)
    }

    /// Pull requests in no particular order.
    pub fn pulls(&self) -> impl Iterator<Item = &WorkItem> {
        self.of_kind(WorkItemKind::PullRequest)
    }

    fn of_kind(&self, kind: WorkItemKind) -> impl Iterator<Item = &WorkItem> {
        self.items.values().filter(move |item| item.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
