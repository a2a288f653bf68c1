//! 集成测试共用的工具：内存后端、令牌签发和请求发送
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use apigw::{
    AppState,
    common::{RequestId, TokenPair},
    config::Config,
    error::BackendError,
    infrastructure::AuthService,
    router::create_router,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";
pub const ADMIN_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub request_id: String,
    pub args: Value,
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    failure: Option<BackendError>,
}

/// 记录调用的内存后端，可以预设失败
#[derive(Clone, Default)]
pub struct MockAuth {
    state: Arc<Mutex<MockState>>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(err: BackendError) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().failure = Some(err);
        mock
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, method: &'static str, request_id: &RequestId, args: Value) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            method,
            request_id: request_id.to_string(),
            args,
        });
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl AuthService for MockAuth {
    async fn register(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<i64, BackendError> {
        self.record("register", request_id, json!({"email": email, "password": password}))?;
        Ok(42)
    }

    async fn login(
        &self,
        request_id: &RequestId,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, BackendError> {
        self.record("login", request_id, json!({"email": email, "password": password}))?;
        Ok(TokenPair {
            access_token: "AT".into(),
            refresh_token: "RT".into(),
        })
    }

    async fn refresh_token(
        &self,
        request_id: &RequestId,
        refresh_token: &str,
    ) -> Result<TokenPair, BackendError> {
        self.record("refresh", request_id, json!({"refreshToken": refresh_token}))?;
        Ok(TokenPair {
            access_token: "AT2".into(),
            refresh_token: "RT2".into(),
        })
    }

    async fn set_banned(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_banned: bool,
    ) -> Result<bool, BackendError> {
        self.record("set_banned", request_id, json!({"userId": user_id, "flag": is_banned}))?;
        Ok(is_banned)
    }

    async fn set_deleted(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_deleted: bool,
    ) -> Result<bool, BackendError> {
        self.record("set_deleted", request_id, json!({"userId": user_id, "flag": is_deleted}))?;
        Ok(is_deleted)
    }

    async fn set_admin(
        &self,
        request_id: &RequestId,
        user_id: i64,
        is_admin: bool,
    ) -> Result<bool, BackendError> {
        self.record("set_admin", request_id, json!({"userId": user_id, "flag": is_admin}))?;
        Ok(is_admin)
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "HTTP_PORT" => Some("8080".into()),
        "AUTH_ADDR" => Some("localhost:44044".into()),
        "TOKEN_SECRET" => Some(SECRET.into()),
        "SERVICE_NAME" => Some("apigw-test".into()),
        _ => None,
    })
    .unwrap()
}

pub fn app(mock: MockAuth) -> Router {
    create_router(AppState::new(test_config(), mock))
}

pub fn mint_token(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn admin_token() -> String {
    mint_token(json!({
        "id": ADMIN_ID,
        "email": "admin@example.com",
        "isAdmin": true,
        "exp": chrono::Utc::now().timestamp() + 3600,
    }))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn request_id(&self) -> String {
        self.headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: &str,
    token: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> TestResponse {
    send(app, Method::POST, uri, body, None).await
}

pub async fn put_json(app: Router, uri: &str, body: &str, token: Option<&str>) -> TestResponse {
    send(app, Method::PUT, uri, body, token).await
}
