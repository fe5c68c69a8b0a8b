use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::ClientConfig,
    models::{EventId, UserId},
};

pub const ENV_PREFIX: &str = "PMC_";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Read from `PMC_`-prefixed environment variables, e.g. `PMC_API_URL`.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub event_id: Uuid,
    pub user_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env::<AppConfig>()
    }

    pub fn event_id(&self) -> EventId {
        EventId(self.event_id)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .as_deref()
            .map(UserId::from)
            .filter(|user_id| !user_id.is_empty())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            request_timeout: Some(Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            )),
        }
    }
}
