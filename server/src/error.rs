//! Error envelope returned by every failing endpoint.
//!
//! All failures are synchronous and map straight to a status code plus
//! `{"success": false, "message": ...}`. Nothing here is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Create called without a usable `name`/`description`.
    #[error("Name and description are required")]
    Validation,

    /// Delete target is absent.
    #[error("Item not found")]
    NotFound,

    /// No route matched the request.
    #[error("Route not found")]
    RouteNotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingFields => ApiError::Validation,
            StoreError::NotFound(_) => ApiError::NotFound,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_errors() {
        assert_eq!(
            ApiError::from(StoreError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::NotFound(7)).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn envelope_carries_message_and_failure_flag() {
        let response = ApiError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = ErrorBody {
            success: false,
            message: ApiError::Validation.to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Name and description are required");
    }
}
