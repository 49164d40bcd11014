//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store, seeds an admin and
//! offers helpers to create accounts and send JSON requests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use taskflow_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, RbacConfig},
};
use taskflow_shared::{
    auth::authorization::StatusUpdatePolicy,
    store::{MemoryStore, Store},
};
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";
pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// An account created through the API, with a live token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Test context containing the router and the seeded admin
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub admin: TestUser,
}

pub fn test_config(status_updates: StatusUpdatePolicy) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_minutes: 60,
        },
        rbac: RbacConfig { status_updates },
        admin_password: Some(PASSWORD.to_string()),
    }
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_policy(StatusUpdatePolicy::WritersOnly).await
    }

    pub async fn with_policy(status_updates: StatusUpdatePolicy) -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(store, test_config(status_updates));

        state
            .users
            .seed_admin("admin", "admin@taskflow.local", PASSWORD)
            .await
            .unwrap()
            .unwrap();

        let app = build_router(state.clone());

        let mut ctx = Self {
            app,
            state,
            admin: TestUser {
                id: String::new(),
                username: "admin".to_string(),
                token: String::new(),
            },
        };
        ctx.admin = ctx.login("admin").await;
        ctx
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            username: username.to_string(),
            token: body["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Self-registration; always yields a read_write account
    pub async fn register(&self, username: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        self.login(username).await
    }

    /// Account with an arbitrary role, created by the admin
    pub async fn create_user(&self, username: &str, role: &str) -> TestUser {
        let (status, body) = self
            .post(
                "/api/users",
                &self.admin.token,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);

        self.login(username).await
    }

    pub async fn create_project(&self, owner: &TestUser, name: &str) -> String {
        let (status, body) = self
            .post("/api/projects", &owner.token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);

        body["id"].as_str().unwrap().to_string()
    }

    pub async fn add_member(&self, owner: &TestUser, project_id: &str, member: &TestUser) {
        let (status, body) = self
            .post(
                &format!("/api/projects/{}/members", project_id),
                &owner.token,
                json!({ "member_id": member.id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add member failed: {}", body);
    }

    pub async fn create_task(&self, creator: &TestUser, project_id: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/tasks",
                &creator.token,
                json!({ "title": title, "project_id": project_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);

        body["id"].as_str().unwrap().to_string()
    }
}
