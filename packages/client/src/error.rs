use cms_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session missing or expired, log in again")]
    Unauthorized,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Map a non-success HTTP status and its `{ message }` body
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => StoreError::Unauthorized,
            404 => StoreError::NotFound(message),
            409 => StoreError::Conflict(message),
            400 | 422 => StoreError::Validation(message),
            _ => StoreError::UnexpectedStatus { status, message },
        }
    }

    /// HTTP status the mock backend answers with for this error
    pub fn status(&self) -> u16 {
        match self {
            StoreError::Unauthorized | StoreError::InvalidCredentials(_) => 401,
            StoreError::NotFound(_) => 404,
            StoreError::Conflict(_) => 409,
            StoreError::Validation(_) => 400,
            StoreError::UnexpectedStatus { status, .. } => *status,
            StoreError::Network(_) | StoreError::Decode(_) => 502,
        }
    }

    /// Whether the caller has to log in (again) before retrying
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Unauthorized | StoreError::InvalidCredentials(_)
        )
    }
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}
