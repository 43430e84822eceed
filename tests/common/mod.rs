#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use user_api::app::build_app;
use user_api::config::{AppEnv, Config};
use user_api::services::auth::TokenService;
use user_api::services::password::MIN_HASH_COST;
use user_api::services::users::{InMemoryUserService, Role, UserPatch, UserService};
use user_api::state::AppState;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";
pub const PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserService>,
    pub tokens: Arc<TokenService>,
}

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        database_url: None,
        jwt_secret: TEST_SECRET.to_string(),
        access_token_ttl_seconds: 3600,
        access_token_leeway_seconds: 0,
        password_hash_cost: MIN_HASH_COST,
        request_timeout: Duration::from_secs(30),
    }
}

pub fn setup_test_app() -> TestApp {
    let config = test_config();
    let users = Arc::new(InMemoryUserService::new(config.password_hash_cost));
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.access_token_ttl_seconds,
        config.access_token_leeway_seconds,
    ));
    let state = AppState::new(users.clone(), tokens.clone());

    TestApp {
        router: build_app(state, &config),
        users,
        tokens,
    }
}

impl TestApp {
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
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let (status, _, value) = self.request(builder.body(body).unwrap()).await;
        (status, value)
    }

    /// POST a raw body with an explicit content type.
    pub async fn send_raw(
        &self,
        uri: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(body.into())
            .unwrap();
        let (status, _, value) = self.request(request).await;
        (status, value)
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))
        };
        (status, headers, value)
    }

    pub async fn register(&self, username: &str) -> StatusCode {
        let (status, _) = self
            .send(
                "POST",
                "/users/register",
                None,
                Some(json!({
                    "username": username,
                    "password": PASSWORD,
                    "firstName": "Test",
                    "lastName": "User",
                })),
            )
            .await;
        status
    }

    /// Returns (user id, token).
    pub async fn login(&self, username: &str) -> (Uuid, String) {
        let (status, body) = self
            .send(
                "POST",
                "/users/authenticate",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
        (id, body["token"].as_str().unwrap().to_string())
    }

    pub async fn register_and_login(&self, username: &str) -> (Uuid, String) {
        assert_eq!(self.register(username).await, StatusCode::OK);
        self.login(username).await
    }

    /// Registers `username`, promotes it to admin and logs in again so the token carries the role.
    pub async fn admin(&self, username: &str) -> (Uuid, String) {
        let (id, _) = self.register_and_login(username).await;
        self.users
            .update(
                id,
                UserPatch {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        self.login(username).await
    }
}
