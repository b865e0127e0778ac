use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cms_client::StoreError;
use serde_json::json;

/// Store error rendered as `{ message, statusCode }`
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(StoreError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &self.0 {
            StoreError::Unauthorized => "Unauthorized".to_string(),
            StoreError::InvalidCredentials(message)
            | StoreError::NotFound(message)
            | StoreError::Conflict(message)
            | StoreError::Validation(message)
            | StoreError::Network(message)
            | StoreError::Decode(message)
            | StoreError::UnexpectedStatus { message, .. } => message.clone(),
        };

        (
            status,
            Json(json!({ "message": message, "statusCode": status.as_u16() })),
        )
            .into_response()
    }
}
