//! Router-level tests for health, CORS and the upload gateway

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{send, TestApp};
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn test_health_with_configured_store() {
    let app = TestApp::start().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "store": "configured" }));
}

#[tokio::test]
async fn test_health_without_credentials() {
    let app = TestApp::start_with(|config| config.store.cloud_name = None).await;
    let (_, body) = app.get("/health").await;
    assert_eq!(body["store"], "unconfigured");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::start().await;
    let (status, _) = app.get("/api/v1/media/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight_on_cleanup() {
    let app = TestApp::start().await;

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/media/cleanup")
            .header(header::ORIGIN, "https://orbfood.app")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_upload_signs_and_forwards() {
    let app = TestApp::start().await;

    Mock::given(method("POST"))
        .and(path("/orbfood/auto/upload"))
        .and(body_string_contains("orbfood/shops"))
        .and(body_string_contains("test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "orbfood/shops/abc",
            "secure_url": "https://res.cloudinary.com/orbfood/image/upload/v9/orbfood/shops/abc.png"
        })))
        .expect(1)
        .mount(&app.store)
        .await;

    let boundary = "orb-test";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\nshops\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary
    );

    let (status, json) = send(
        app.router.clone(),
        Request::builder()
            .method("POST")
            .uri("/api/v1/media/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "secure_url": "https://res.cloudinary.com/orbfood/image/upload/v9/orbfood/shops/abc.png"
        })
    );
}

#[tokio::test]
async fn test_upload_rejects_bad_folder() {
    let app = TestApp::start().await;

    let boundary = "orb-test";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\n../etc\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNG\r\n--{b}--\r\n",
        b = boundary
    );

    let (status, json) = send(
        app.router.clone(),
        Request::builder()
            .method("POST")
            .uri("/api/v1/media/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Invalid folder '../etc'" }));
}
