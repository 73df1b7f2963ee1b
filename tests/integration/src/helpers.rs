//! Test server and HTTP helpers
//!
//! Tests call [`check_test_env`] first and return early when no database is
//! configured.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mart_api::{create_app, create_app_state};
use mart_common::AppConfig;
use mart_db::PgPool;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{register_payload, PASSWORD};

/// A running API server bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub pool: PgPool,
    _handle: JoinHandle<()>,
}

/// A registered account and its access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let pool = state.pool().clone();
        let app = create_app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            pool,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = if path.starts_with("/health") {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/api/v1{}", self.base_url(), path)
        };
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        Ok(self.request(Method::GET, path, token).send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        Ok(self
            .request(Method::POST, path, token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self
            .request(Method::PATCH, path, Some(token))
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .request(Method::DELETE, path, Some(token))
            .send()
            .await?)
    }

    /// Register a fresh account and return its token
    pub async fn register(&self, first_name: &str) -> Result<TestUser> {
        let payload = register_payload(first_name);
        let response = self.post("/auth/register", None, &payload).await?;
        let data = expect_data(response, StatusCode::CREATED).await?;

        Ok(TestUser {
            id: str_field(&data["user"], "id")?,
            email: str_field(&data["user"], "email")?,
            token: str_field(&data, "access_token")?,
        })
    }

    /// Register an account and grant it a role straight in the database
    pub async fn register_with_role(&self, first_name: &str, role: &str) -> Result<TestUser> {
        let user = self.register(first_name).await?;
        let id: i64 = user.id.parse().context("user id is not numeric")?;

        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn login(&self, email: &str) -> Result<Response> {
        let body = serde_json::json!({ "email": email, "password": PASSWORD });
        self.post("/auth/login", None, &body).await
    }
}

/// Configuration from the environment, with rate limits loose enough for tests
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    config.rate_limit.requests_per_second = 1000;
    config.rate_limit.burst = 1000;
    Ok(config)
}

pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    if std::env::var("JWT_SECRET").is_err() {
        eprintln!("Skipping test: JWT_SECRET not set");
        return false;
    }
    true
}

/// Check the status and success envelope, returning `data`
pub async fn expect_data(response: Response, expected: StatusCode) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected {
        bail!("Expected status {expected}, got {status}. Body: {body}");
    }

    let json: Value = serde_json::from_str(&body)?;
    if json["success"] != Value::Bool(true) {
        bail!("Expected success envelope, got {json}");
    }
    Ok(json["data"].clone())
}

/// Check the status and error envelope, returning the error code
pub async fn expect_error(response: Response, expected: StatusCode) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected {
        bail!("Expected status {expected}, got {status}. Body: {body}");
    }

    let json: Value = serde_json::from_str(&body)?;
    if json["success"] != Value::Bool(false) {
        bail!("Expected error envelope, got {json}");
    }
    str_field(&json, "code")
}

pub fn str_field(value: &Value, name: &str) -> Result<String> {
    value[name]
        .as_str()
        .map(String::from)
        .with_context(|| format!("missing string field {name} in {value}"))
}
