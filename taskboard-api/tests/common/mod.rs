/// Common test utilities for integration tests
///
/// Tests run against the database named by `DATABASE_URL` and need
/// `JWT_SECRET` set, exactly like the server. Every helper creates rows with
/// unique emails so tests can share one database.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::db::migrations::run_migrations;
use taskboard_shared::models::{project::Project, user::User};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
}

/// A registered user and the cookie of their session
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i32,
    pub email: String,
    pub cookie: String,
}

/// Response status, headers and JSON body
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestContext {
    /// Connects, migrates and builds the router
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a JSON request, optionally with a session cookie
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Sends a bodyless request with a session cookie
    pub async fn call(&self, method: Method, uri: &str, cookie: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Sends `name`, `email` and a PNG `photo` to update-user as multipart
    pub async fn upload_photo(&self, user: &TestUser, host: &str, png: &[u8]) -> TestResponse {
        let mut body = format!(
            "--B\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nphoto user\r\n\
             --B\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\n{}\r\n\
             --B\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"me.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            user.email
        )
        .into_bytes();
        body.extend_from_slice(png);
        body.extend_from_slice(b"\r\n--B--\r\n");

        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/v1/auth/update-user/{}", user.id))
            .header(header::HOST, host)
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=B")
            .header(header::COOKIE, &user.cookie)
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// On-disk path of an uploaded photo URL
    pub fn photo_file(&self, photo_url: &str) -> PathBuf {
        let name = photo_url.rsplit('/').next().unwrap();
        self.config.uploads_dir().join(name)
    }

    /// Registers a fresh user and returns their session
    pub async fn register(&self) -> TestUser {
        let email = unique_email();

        let response = self
            .json(
                Method::POST,
                "/api/v1/auth/register",
                None,
                json!({ "name": "test user", "email": email, "password": "secret" }),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        TestUser {
            id: response.body["data"]["id"].as_i64().unwrap() as i32,
            email,
            cookie: session_cookie(&response.headers).unwrap(),
        }
    }

    /// Creates a project through the API and returns its id
    pub async fn create_project(&self, user: &TestUser) -> i32 {
        let response = self
            .json(
                Method::POST,
                "/api/v1/projects",
                Some(&user.cookie),
                json!({
                    "name": format!("Project {}", Uuid::new_v4()),
                    "description": "Integration test project",
                    "status": "Not Started"
                }),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_i64().unwrap() as i32
    }

    /// Removes a test user (their tasks go with them)
    pub async fn cleanup_user(&self, user: &TestUser) {
        User::delete(&self.db, user.id).await.unwrap();
    }

    pub async fn cleanup_project(&self, project_id: i32) {
        Project::delete(&self.db, project_id).await.unwrap();
    }
}

/// Email no other test will use
pub fn unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Extracts `jwt=<token>` from a `Set-Cookie` header
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("jwt="))
        .map(str::to_string)
}

/// Waits for a background file removal to land
pub async fn wait_until_removed(path: &Path) -> bool {
    for _ in 0..50 {
        if !path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !path.exists()
}
