use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: Uuid,
    pub event_id: EventId,
    pub team_name: String,
    pub team_code: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Enforced by the backend; the client only reflects it.
    pub const MAX_MEMBERS: usize = 4;

    pub fn is_full(&self) -> bool {
        self.members.len() >= Team::MAX_MEMBERS
    }

    pub fn has_member(&self, attendee_id: Uuid) -> bool {
        self.members.iter().any(|m| m.attendee_id == attendee_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub attendee_id: Uuid,
    pub user: TeamMemberUser,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
