use serde_json::{Map, Value};

use super::{EventId, UserId};

/// Field name to value. Backed by a sorted map, so serializing equal drafts yields equal strings.
pub type Draft = Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub event_id: EventId,
    pub user_id: UserId,
}

impl DraftKey {
    pub fn new(event_id: EventId, user_id: UserId) -> DraftKey {
        DraftKey { event_id, user_id }
    }

    pub fn is_complete(&self) -> bool {
        !self.event_id.is_nil() && !self.user_id.is_empty()
    }
}
