use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{types::UtcDateTime, EventId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

/// A file picked locally and not yet uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverableFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedFile {
    pub deliverable_id: String,
    pub file_name: String,
    pub file_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: Uuid,
    pub event_id: EventId,
    pub submitted_at: UtcDateTime,
    #[serde(default)]
    pub files: Vec<SubmittedFile>,
}
