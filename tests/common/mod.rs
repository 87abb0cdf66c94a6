#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use polling_app::{build_router, config::Config, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

pub fn app() -> Router {
    build_router(AppState::in_memory(Config::for_tests()).unwrap()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/register",
            None,
            serde_json::json!({ "username": username, "password": password }),
        ),
    )
    .await
}

pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", username, password)))
        .unwrap();
    send(app, request).await
}

/// Registers `username` and returns a bearer token for it.
pub async fn token_for(app: &Router, username: &str) -> String {
    let (status, _) = register(app, username, "password").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(app, username, "password").await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn create_poll(app: &Router, token: &str, question: &str, options: &[&str]) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/polls",
            Some(token),
            serde_json::json!({ "question": question, "options": options }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}
