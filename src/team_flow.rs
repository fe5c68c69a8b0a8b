use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    api::TeamApi,
    models::{EventId, Team},
    utils::TrimmedString,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TeamFlowError {
    #[error("Team name is required.")]
    MissingName,
    #[error("Team code is required.")]
    MissingCode,
    #[error("Team name unavailable!")]
    NameUnavailable,
    #[error("Unable to create team.")]
    CreateFailed,
    #[error("Unable to join team. Please check the code.")]
    JoinFailed,
}

pub struct TeamFlow<A: TeamApi + ?Sized> {
    api: Arc<A>,
    event_id: EventId,
    team: Option<Team>,
}

impl<A: TeamApi + ?Sized> TeamFlow<A> {
    pub fn new(api: Arc<A>, event_id: EventId) -> TeamFlow<A> {
        TeamFlow {
            api,
            event_id,
            team: None,
        }
    }

    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    #[tracing::instrument(skip(self), fields(event_id = %self.event_id))]
    pub async fn refresh(&mut self) -> Option<&Team> {
        match self.api.get_team(self.event_id).await {
            Ok(team) => self.team = team,
            Err(err) => {
                warn!("Could not fetch team: {err}");
                self.team = None;
            }
        }
        self.team.as_ref()
    }

    #[tracing::instrument(skip(self, team_name), fields(event_id = %self.event_id))]
    pub async fn create_team(
        &mut self,
        team_name: impl Into<TrimmedString>,
    ) -> Result<&Team, TeamFlowError> {
        let team_name = team_name
            .into()
            .non_empty()
            .ok_or(TeamFlowError::MissingName)?;

        match self.api.create_team(self.event_id, team_name.as_ref()).await {
            Ok(team) => {
                info!("Created team {} ({})", team.team_name, team.team_id);
                Ok(&*self.team.insert(team))
            }
            Err(err) if err.is_conflict() => {
                info!("Team name {team_name:?} is taken: {err}");
                Err(TeamFlowError::NameUnavailable)
            }
            Err(err) => {
                error!("Could not create team: {err}");
                Err(TeamFlowError::CreateFailed)
            }
        }
    }

    #[tracing::instrument(skip(self, team_code), fields(event_id = %self.event_id))]
    pub async fn join_team(
        &mut self,
        team_code: impl Into<TrimmedString>,
    ) -> Result<&Team, TeamFlowError> {
        let team_code = team_code
            .into()
            .non_empty()
            .ok_or(TeamFlowError::MissingCode)?;

        match self.api.join_team(self.event_id, team_code.as_ref()).await {
            Ok(team) => {
                info!("Joined team {} ({})", team.team_name, team.team_id);
                Ok(&*self.team.insert(team))
            }
            Err(err) => {
                warn!("Could not join team with code {team_code}: {err}");
                Err(TeamFlowError::JoinFailed)
            }
        }
    }

    /// Leaving is best effort: failures are logged and the local team is kept.
    #[tracing::instrument(skip(self), fields(event_id = %self.event_id))]
    pub async fn leave_team(&mut self) {
        match self.api.leave_team(self.event_id).await {
            Ok(()) => {
                info!("Left team");
                self.team = None;
            }
            Err(err) => error!("Could not leave team: {err}"),
        }
    }
}
