use serde::{Deserialize, Serialize};
use strum::Display;

use super::{types::UtcDateTime, EventId};

/// Server-owned switch for one kind of deliverable: whether it is accepted at all, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverableFlag {
    pub id: String,
    pub event_id: EventId,
    pub starttime: UtcDateTime,
    pub deadline: UtcDateTime,
    pub is_enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionStatus {
    Locked,
    Open,
    Closed,
    Disabled,
}
