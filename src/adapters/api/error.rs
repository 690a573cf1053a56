//! API error mapping: typed failures to HTTP status + JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use super::types::ErrorResponse;
use crate::domain::BetError;

/// Errors surfaced by lobby API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bet placement or deposit rejected.
    #[error(transparent)]
    Bet(#[from] BetError),
    /// Unknown resource.
    #[error("{0}")]
    NotFound(String),
    /// Malformed request parameter.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Bet(BetError::InvalidAmount(_) | BetError::InsufficientBalance { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Bet(BetError::MarketLocked { .. } | BetError::OddsChanged { .. }) => {
                StatusCode::CONFLICT
            }
            Self::Bet(BetError::SelectionNotFound { .. }) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Bet(e) => e.kind(),
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
