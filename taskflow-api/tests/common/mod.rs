//! Common test utilities for integration tests
//!
//! Builds the full router over a fresh `MemoryStore` (cheap Argon2 costs) and
//! drives it in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use taskflow_api::app::{build_router, AppState};
use taskflow_api::config::Config;
use taskflow_shared::auth::password::HashParams;
use taskflow_shared::store::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
    pub config: Config,
}

/// A signed-up account
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Response with its body parsed as JSON (`Value::Null` when empty)
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error envelope
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// Value of the `rt` cookie set by this response, if any
    pub fn refresh_cookie(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next().map(str::to_string))
            .and_then(|pair| pair.strip_prefix("rt=").map(str::to_string))
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::for_memory(TEST_SECRET))
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let state =
            AppState::with_hash_params(Arc::new(store.clone()), config.clone(), HashParams::fast());

        Self {
            store,
            app: build_router(state),
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// JSON request, optionally authenticated
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, user.bearer());
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.call(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&TestUser>, body: Value) -> TestResponse {
        self.call(Method::POST, uri, user, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.call(Method::PATCH, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.call(Method::DELETE, uri, Some(user), None).await
    }

    /// `POST /api/auth/refresh` with the given cookie value
    pub async fn refresh(&self, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::POST).uri("/api/auth/refresh");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, format!("rt={}", cookie));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `POST /api/auth/logout` with bearer and cookie
    pub async fn logout(&self, user: &TestUser, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(header::AUTHORIZATION, user.bearer());
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, format!("rt={}", cookie));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Signs up a fresh account with password `password123`
    pub async fn signup(&self, name: &str) -> TestUser {
        let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
        let response = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "name": name, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "signup failed: {:?}", response.body);

        TestUser {
            id: response.body["user"]["id"].as_str().unwrap().parse().unwrap(),
            email,
            access_token: response.body["accessToken"].as_str().unwrap().to_string(),
            refresh_token: response.refresh_cookie().unwrap(),
        }
    }

    /// Creates a project owned by `user`, returning its id
    pub async fn create_project(&self, user: &TestUser, name: &str) -> String {
        let response = self
            .post("/api/projects", Some(user), json!({ "name": name }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    pub async fn add_member(&self, owner: &TestUser, project_id: &str, member: &TestUser) -> TestResponse {
        self.post(
            &format!("/api/projects/{}/add-member", project_id),
            Some(owner),
            json!({ "memberId": member.id }),
        )
        .await
    }

    /// Creates a task, returning its JSON
    pub async fn create_task(&self, user: &TestUser, project_id: &str, fields: Value) -> Value {
        let mut body = fields;
        body["projectId"] = json!(project_id);

        let response = self.post("/api/tasks", Some(user), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }
}
