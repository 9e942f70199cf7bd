#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use todo_api_rust::auth::JwtAuth;
use todo_api_rust::config::AppConfig;
use todo_api_rust::database::MemoryTodoStore;
use todo_api_rust::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router over a fresh in-memory store plus a token issuer sharing its secret
pub struct TestApp {
    pub router: Router,
    pub auth: JwtAuth,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let auth = JwtAuth::from_config(&config.security);
        let state = AppState::new(Arc::new(MemoryTodoStore::new()), config);
        Self { router: app(state), auth }
    }

    pub fn token(&self, user: Uuid) -> String {
        self.auth.issue(user).expect("issue token")
    }

    /// Send a request as `user`; `None` sends no Authorization header
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        send_raw(&self.router, request).await
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Uuid, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Uuid) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// Create a todo and return its id
    pub async fn create(&self, user: Uuid, title: &str, done: bool) -> Result<String> {
        let (status, body) = self
            .post("/todos", user, serde_json::json!({ "title": title, "isCompleted": done }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create failed: {} {}", status, body);
        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("created todo has no id: {}", body))
    }
}

/// Development profile with a known secret and request logging off
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.api.enable_request_logging = false;
    config
}

/// Drive one request through the router; empty bodies decode as `Value::Null`
pub async fn send_raw(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}
