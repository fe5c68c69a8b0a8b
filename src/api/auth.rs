use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

#[derive(Clone, Debug, Default)]
pub struct AuthToken {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthToken {
    pub fn new() -> AuthToken {
        AuthToken::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        match self.token.write() {
            Ok(mut guard) => {
                *guard = Some(token.into());
                debug!("Access token set");
            }
            Err(err) => warn!("Could not store access token: {err}"),
        }
    }

    pub fn clear(&self) {
        match self.token.write() {
            Ok(mut guard) => {
                *guard = None;
                debug!("Access token cleared");
            }
            Err(err) => warn!("Could not clear access token: {err}"),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}
