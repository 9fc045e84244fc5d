use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::models::QuotaKind;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
    #[error("invalid upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no profile for authenticated user")]
    ProfileMissing,
    #[error("swipe history write failed after the match was stored: {0}")]
    HistoryAfterMatch(#[source] Box<BackendError>),
}

impl BackendError {
    pub fn match_committed(&self) -> bool {
        matches!(self, BackendError::HistoryAfterMatch(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("daily {0} quota reached")]
    QuotaExhausted(QuotaKind),
    #[error("no cards left in deck")]
    DeckFinished,
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Backend(BackendError::Database(err))
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Backend(BackendError::ProfileMissing) => {
                (StatusCode::CONFLICT, "profile_missing")
            }
            AppError::Backend(BackendError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            AppError::Backend(_) => (StatusCode::BAD_GATEWAY, "bad_gateway"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            AppError::QuotaExhausted(_) => (StatusCode::TOO_MANY_REQUESTS, "quota_exhausted"),
            AppError::DeckFinished => (StatusCode::CONFLICT, "deck_finished"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, code, "request_failed");
        }

        // Upstream bodies are passed through so the client sees the backend's reason.
        if let AppError::Backend(BackendError::Status {
            body: Some(body), ..
        }) = &self
        {
            return (status, Json(body.clone())).into_response();
        }

        (
            status,
            Json(json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exhaustion_maps_to_429() {
        let resp = AppError::QuotaExhausted(QuotaKind::Swipe).into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn missing_profile_is_a_conflict_not_a_gateway_error() {
        let resp = AppError::from(BackendError::ProfileMissing).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
