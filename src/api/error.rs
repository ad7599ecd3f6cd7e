use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::errors::ContentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl ContentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContentError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ContentError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            ContentError::Decode(_) => StatusCode::BAD_REQUEST,
            // Encoder mismatches and broken registrations are server-side
            // faults, never the client's.
            ContentError::Type(_) | ContentError::Registration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
