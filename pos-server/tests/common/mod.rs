//! 集成测试公共工具
//!
//! 每个测试使用独立的临时工作目录和完整初始化的 ServerState，
//! 通过 oneshot 直接调用 Router，不经过网络栈。

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use pos_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const OWNER_USERNAME: &str = "owner";
pub const OWNER_PIN: &str = "1234";

pub struct TestApp {
    pub state: ServerState,
    pub app: Router,
    _work_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let work_dir = TempDir::new().expect("create temp work dir");
        let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        config.seed_owner_username = OWNER_USERNAME.to_string();
        config.seed_owner_pin = OWNER_PIN.to_string();

        let state = ServerState::initialize(&config).expect("initialize state");
        let app = build_app(&state).with_state(state.clone());
        Self {
            state,
            app,
            _work_dir: work_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
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
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self.app.clone().oneshot(request).await.expect("call router");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    /// 登录并返回令牌
    pub async fn login(&self, username: &str, pin: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "pin": pin })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"].as_str().expect("token").to_string()
    }

    pub async fn owner_token(&self) -> String {
        self.login(OWNER_USERNAME, OWNER_PIN).await
    }

    /// 店主创建员工并登录，返回 (员工 ID, 令牌)
    pub async fn staff(&self, owner_token: &str, username: &str, role: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/staff",
                owner_token,
                json!({
                    "full_name": format!("{} test", username),
                    "username": username,
                    "pin": "4321",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create staff failed: {}", body);
        let id = body["data"]["id"].as_str().expect("staff id").to_string();
        let token = self.login(username, "4321").await;
        (id, token)
    }

    /// 创建分类，返回 ID
    pub async fn category(&self, owner_token: &str, name: &str, station: &str) -> String {
        let (status, body) = self
            .post(
                "/api/categories",
                owner_token,
                json!({ "name": { "en": name, "am": name }, "prep_station": station }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create category failed: {}", body);
        body["data"]["id"].as_str().expect("category id").to_string()
    }

    /// 创建菜品，返回 ID
    pub async fn menu_item(
        &self,
        owner_token: &str,
        category_id: &str,
        name: &str,
        price: f64,
        station: &str,
        stock: Option<i64>,
    ) -> String {
        let mut payload = json!({
            "name": { "en": name, "am": name },
            "category_id": category_id,
            "pricing": { "dine_in": price, "takeaway": price },
            "prep_station": station,
        });
        if let Some(stock) = stock {
            payload["stock_tracking"] = json!({
                "enabled": true,
                "current_stock": stock,
                "min_stock": 2,
            });
        }
        let (status, body) = self.post("/api/menu-items", owner_token, payload).await;
        assert_eq!(status, StatusCode::OK, "create menu item failed: {}", body);
        body["data"]["id"].as_str().expect("menu item id").to_string()
    }
}
