//! Error responses.
//!
//! # Responsibilities
//! - Map `TenancyError` to HTTP status codes
//! - Render a stable JSON body with a localized message
//!
//! # Design Decisions
//! - Internal failure detail is logged, never returned
//! - Body shape: `{"error": <code>, "message": <pt-BR text>}` plus quota
//!   numbers for `quota_exceeded`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::TenancyError;

impl TenancyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TenancyError::TenantNotIdentified => StatusCode::UNAUTHORIZED,
            TenancyError::TenantInvalid(_) => StatusCode::FORBIDDEN,
            TenancyError::QuotaExceeded { .. } => StatusCode::FORBIDDEN,
            TenancyError::FeatureUnavailable { .. } => StatusCode::FORBIDDEN,
            TenancyError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TenancyError {
    fn into_response(self) -> Response {
        if let TenancyError::Repository(e) = &self {
            tracing::error!(error = %e, "Tenant store failure, request refused");
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.user_message(),
        });
        if let TenancyError::QuotaExceeded { current, limit, .. } = &self {
            body["current"] = json!(current);
            body["limit"] = json!(limit);
        }

        (self.status_code(), Json(body)).into_response()
    }
}
