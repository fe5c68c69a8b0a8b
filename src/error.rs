use lazy_regex::regex_is_match;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    // Some endpoints report conflicts as a plain 400 ending in "already exists".
    pub fn from_status(status: u16, message: impl Into<String>) -> ApiError {
        let message = message.into();

        match status {
            404 => ApiError::NotFound,
            401 | 403 => ApiError::Unauthorized(message),
            409 => ApiError::Conflict(message),
            _ if is_conflict_message(&message) => ApiError::Conflict(message),
            _ => ApiError::Status { status, message },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

fn is_conflict_message(message: &str) -> bool {
    regex_is_match!(r#"(?i)already (exists|taken)[.!"}]*\s*$"#, message)
}
