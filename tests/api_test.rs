use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt; // for `collect`
use tower::ServiceExt; // for `oneshot`

use mimebox::api;
use mimebox::api::state::AppState;
use mimebox::config::Config;
use mimebox::handlers::ContentSettings;

/// Builds the demo app the way `api::run` does, minus the listener.
fn build_test_app() -> Router {
    let config = Config::default();
    let mut settings = ContentSettings::with_defaults();
    settings.set_default_content_type(Some(config.content.default_content_type.clone()));
    api::router(AppState::new(config, settings))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("failed to read response body")
        .to_bytes()
        .to_vec()
}

fn post(content_type: &str, accept: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, content_type);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(body.into()).unwrap()
}

#[tokio::test]
async fn content_type_default_works() {
    let app = build_test_app();
    let response = app
        .oneshot(post("application/json", None, "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=\"utf-8\""
    );
}

#[tokio::test]
async fn non_matching_accept_uses_default() {
    let app = build_test_app();
    let response = app
        .oneshot(post("application/json", Some("application/xml"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=\"utf-8\""
    );
}

#[tokio::test]
async fn accept_header_is_obeyed() {
    let app = build_test_app();
    let response = app
        .oneshot(post("application/json", Some("application/msgpack"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/msgpack"
    );
    // The empty JSON object re-encodes as an empty fixmap.
    assert_eq!(body_bytes(response).await, vec![0x80]);
}

#[tokio::test]
async fn msgpack_request_returns_default_type() {
    let app = build_test_app();
    let response = app
        .oneshot(post(
            "application/msgpack",
            None,
            Body::from(vec![0x80_u8]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=\"utf-8\""
    );
    assert_eq!(body_bytes(response).await, b"{}");
}

#[tokio::test]
async fn msgpack_body_transcodes_to_json() {
    // {"name": "value", "embedded": {"utf8": "✱"}} packed canonically.
    let mut packed = vec![0x82_u8];
    packed.push(0xA4);
    packed.extend_from_slice(b"name");
    packed.push(0xA5);
    packed.extend_from_slice(b"value");
    packed.push(0xA8);
    packed.extend_from_slice(b"embedded");
    packed.push(0x81);
    packed.push(0xA4);
    packed.extend_from_slice(b"utf8");
    let star = "\u{2731}";
    packed.push(0xA0 | star.len() as u8);
    packed.extend_from_slice(star.as_bytes());

    let app = build_test_app();
    let response = app
        .oneshot(post("application/msgpack", None, Body::from(packed)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({"name": "value", "embedded": {"utf8": "\u{2731}"}})
    );
}

#[tokio::test]
async fn unhandled_content_type_results_in_415() {
    let app = build_test_app();
    let response = app
        .oneshot(post(
            "application/xml",
            None,
            "<request><name>value</name></request>",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn missing_content_type_results_in_415() {
    let app = build_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn malformed_body_results_in_400() {
    let app = build_test_app();
    let response = app
        .oneshot(post("application/json", None, "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_bytes(response).await;
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = build_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
