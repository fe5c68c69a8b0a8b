use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::DeliverableApi,
    deliverables::get_submission_status_at,
    error::ApiError,
    models::{
        types::UtcDateTime, Deliverable, DeliverableFile, DeliverableFlag, EventId,
        SubmissionRecord, SubmissionStatus,
    },
};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Submissions are {0}.")]
    NotOpen(SubmissionStatus),
    #[error("Missing required deliverables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("No files selected.")]
    NothingSelected,
    #[error("Unknown deliverable: {0}")]
    UnknownDeliverable(String),
    #[error("Unable to submit deliverables: {0}")]
    Api(#[from] ApiError),
}

pub struct SubmissionFlow<A: DeliverableApi + ?Sized> {
    api: Arc<A>,
    event_id: EventId,
    deliverables: Vec<Deliverable>,
    selected: BTreeMap<String, DeliverableFile>,
    last_submission: Option<SubmissionRecord>,
}

impl<A: DeliverableApi + ?Sized> SubmissionFlow<A> {
    pub fn new(api: Arc<A>, event_id: EventId) -> SubmissionFlow<A> {
        SubmissionFlow {
            api,
            event_id,
            deliverables: Vec::new(),
            selected: BTreeMap::new(),
            last_submission: None,
        }
    }

    #[tracing::instrument(skip(self), fields(event_id = %self.event_id))]
    pub async fn load(&mut self) {
        match self.api.list_deliverables(self.event_id).await {
            Ok(deliverables) => self.deliverables = deliverables,
            Err(err) => warn!("Could not fetch deliverables: {err}"),
        }

        self.refresh_last_submission().await;
    }

    pub fn deliverables(&self) -> &[Deliverable] {
        &self.deliverables
    }

    pub fn last_submission(&self) -> Option<&SubmissionRecord> {
        self.last_submission.as_ref()
    }

    pub fn selected(&self) -> impl Iterator<Item = (&str, &DeliverableFile)> {
        self.selected.iter().map(|(id, file)| (id.as_str(), file))
    }

    pub fn select_file(
        &mut self,
        deliverable_id: &str,
        file: DeliverableFile,
    ) -> Result<(), SubmissionError> {
        if !self.deliverables.iter().any(|d| d.id == deliverable_id) {
            return Err(SubmissionError::UnknownDeliverable(
                deliverable_id.to_owned(),
            ));
        }

        self.selected.insert(deliverable_id.to_owned(), file);
        Ok(())
    }

    pub fn clear_file(&mut self, deliverable_id: &str) {
        self.selected.remove(deliverable_id);
    }

    pub fn missing_required(&self) -> Vec<String> {
        self.deliverables
            .iter()
            .filter(|d| d.required && !self.selected.contains_key(&d.id))
            .map(|d| d.id.clone())
            .collect()
    }

    pub fn check_submittable_at(
        &self,
        flag: Option<&DeliverableFlag>,
        now: UtcDateTime,
    ) -> Result<(), SubmissionError> {
        match get_submission_status_at(flag, now) {
            SubmissionStatus::Open => {}
            status => return Err(SubmissionError::NotOpen(status)),
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingRequired(missing));
        }

        if self.selected.is_empty() {
            return Err(SubmissionError::NothingSelected);
        }

        Ok(())
    }

    pub async fn submit(&mut self, flag: Option<&DeliverableFlag>) -> Result<(), SubmissionError> {
        self.submit_at(flag, UtcDateTime::now()).await
    }

    #[tracing::instrument(skip(self, flag), fields(event_id = %self.event_id))]
    pub async fn submit_at(
        &mut self,
        flag: Option<&DeliverableFlag>,
        now: UtcDateTime,
    ) -> Result<(), SubmissionError> {
        self.check_submittable_at(flag, now)?;

        let files: Vec<(String, DeliverableFile)> = self
            .selected
            .iter()
            .map(|(id, file)| (id.clone(), file.clone()))
            .collect();

        self.api.submit_deliverables(self.event_id, &files).await?;
        info!("Submitted {} deliverable file(s)", files.len());

        self.selected.clear();
        self.refresh_last_submission().await;

        Ok(())
    }

    async fn refresh_last_submission(&mut self) {
        match self.api.latest_submission(self.event_id).await {
            Ok(record) => self.last_submission = record,
            Err(err) => warn!("Could not fetch latest submission: {err}"),
        }
    }
}
