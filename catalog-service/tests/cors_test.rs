mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestApp;

#[tokio::test]
async fn test_preflight_is_answered_by_cors_layer() {
    let app = TestApp::spawn().await;

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/catalog")
                .header(header::ORIGIN, "https://marketing.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let methods = response.headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    for method in ["GET", "DELETE", "PATCH", "POST", "PUT"] {
        assert!(methods.contains(method), "{methods}");
    }
    let headers = response.headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap();
    assert!(headers.contains("authorization"), "{headers}");
    assert!(headers.contains("x-csrf-token"), "{headers}");
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_plain_options_is_an_empty_200() {
    let app = TestApp::spawn().await;

    for uri in ["/verify", "/catalog"] {
        let response = app.request(Method::OPTIONS, uri, None).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");
        assert!(response.body.is_empty());
    }
    assert_eq!(app.verifier.calls(), 0);
    assert_eq!(app.storage.calls(), 0);
}

#[tokio::test]
async fn test_responses_carry_allow_origin() {
    let app = TestApp::spawn().await;

    for (method, uri) in [
        (Method::POST, "/verify"),
        (Method::GET, "/catalog"),
        (Method::GET, "/health"),
    ] {
        let response = app
            .send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::ORIGIN, "https://marketing.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(
            response.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*",
            "{uri}"
        );
    }
}
