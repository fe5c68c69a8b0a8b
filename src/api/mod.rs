mod auth;
mod client;

use async_trait::async_trait;

use crate::{
    error::ApiError,
    models::{
        Attendee, Deliverable, DeliverableFile, DeliverableFlag, Draft, DraftKey, Event, EventId,
        SubmissionRecord, Team,
    },
};

pub use auth::AuthToken;
pub use client::{ClientConfig, PortalClient};

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_event(&self, event_id: EventId) -> Result<Event, ApiError>;
}

#[async_trait]
pub trait DeliverableFlagSource: Send + Sync {
    async fn fetch_deliverable_flags(
        &self,
        event_id: EventId,
    ) -> Result<Vec<DeliverableFlag>, ApiError>;
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load_draft(&self, key: &DraftKey) -> Result<Option<Draft>, ApiError>;

    async fn save_draft(&self, key: &DraftKey, draft: &Draft) -> Result<(), ApiError>;

    async fn delete_draft(&self, key: &DraftKey) -> Result<(), ApiError>;
}

#[async_trait]
pub trait TeamApi: Send + Sync {
    async fn get_team(&self, event_id: EventId) -> Result<Option<Team>, ApiError>;

    async fn create_team(&self, event_id: EventId, team_name: &str) -> Result<Team, ApiError>;

    async fn join_team(&self, event_id: EventId, team_code: &str) -> Result<Team, ApiError>;

    async fn leave_team(&self, event_id: EventId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DeliverableApi: Send + Sync {
    async fn list_deliverables(&self, event_id: EventId) -> Result<Vec<Deliverable>, ApiError>;

    async fn submit_deliverables(
        &self,
        event_id: EventId,
        files: &[(String, DeliverableFile)],
    ) -> Result<(), ApiError>;

    async fn latest_submission(
        &self,
        event_id: EventId,
    ) -> Result<Option<SubmissionRecord>, ApiError>;
}

#[async_trait]
pub trait AttendeeApi: Send + Sync {
    async fn fetch_attendee(&self, event_id: EventId) -> Result<Option<Attendee>, ApiError>;
}
