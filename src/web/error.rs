//! API error responses

use crate::search::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API clients as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(PipelineError::EmptyQuery) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Pipeline(PipelineError::NoResults) => StatusCode::NOT_FOUND,
            Self::Pipeline(PipelineError::SearchTimeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Pipeline(PipelineError::Search(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::SearchError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(PipelineError::NoResults).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PipelineError::EmptyQuery).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(PipelineError::SearchTimeout(Duration::from_secs(10))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(PipelineError::Search(SearchError::Timeout)).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_detail_message() {
        assert_eq!(
            ApiError::from(PipelineError::NoResults).to_string(),
            "No search results found."
        );
    }
}
