use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::state::AppState;
use crate::errors::ContentError;

/// Echo endpoint (POST /).
///
/// Decodes the request body with the handler registered for the declared
/// Content-Type (415 when none is), then re-encodes the decoded value with
/// the handler negotiated from the Accept header (406 when nothing matches
/// and no default content type is configured). The response carries the
/// resolved Content-Type, charset-suffixed for text handlers.
pub async fn echo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ContentError> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            ContentError::UnsupportedMediaType("missing Content-Type header".to_owned())
        })?;

    let decoder = state.settings.select_decoder(declared).map_err(|err| {
        state.metrics.decode_failure();
        err
    })?;
    let value = decoder.decode(&body).map_err(|err| {
        state.metrics.decode_failure();
        err
    })?;
    state.metrics.body_decoded();

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    let (encoder, resolved_content_type) =
        state.settings.select_encoder(accept).map_err(|err| {
            state.metrics.negotiation_failure();
            err
        })?;

    let payload = encoder.encode(&value)?;
    state.metrics.response_encoded();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, resolved_content_type)],
        payload,
    )
        .into_response())
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
