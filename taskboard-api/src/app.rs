/// Application state and router builder
///
/// This module defines the shared application state, the session
/// authentication layer and the function that assembles the Axum router.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{DefaultBodyLimit, OriginalUri, Request, State},
    handler::HandlerWithoutStateExt,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::PgPool;
use std::{convert::Infallible, sync::Arc};
use taskboard_shared::auth::{session, SESSION_COOKIE};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to sign and verify session tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Id of the user behind a validated session
///
/// Inserted into request extensions by [`session_auth_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser(pub i32);

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /api/v1/
/// │   ├── /auth/
/// │   │   ├── POST   /register       # public
/// │   │   ├── POST   /login          # public
/// │   │   ├── GET    /get-user
/// │   │   ├── GET    /logout
/// │   │   ├── PUT    /update-user/:id   (multipart)
/// │   │   ├── DELETE /delete-user/:id
/// │   │   └── GET    /get-users
/// │   ├── /projects/                 # GET, POST; GET, PUT, DELETE /:id
/// │   └── /tasks/                    # GET, POST; GET, PUT, DELETE /:id
/// └── /*                             # Static files from the public dir, else JSON 404
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS
/// 3. Logging (tower-http TraceLayer)
/// 4. Session authentication (everything but register, login and health)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let session_auth_routes = Router::new()
        .route("/get-user", get(routes::auth::get_user))
        .route("/logout", get(routes::auth::logout))
        .route(
            "/update-user/:id",
            put(routes::auth::update_user)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(
                    state.config.uploads.max_upload_bytes,
                )),
        )
        .route("/delete-user/:id", axum::routing::delete(routes::auth::delete_user))
        .route("/get-users", get(routes::auth::get_users))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::get_all_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project_by_id)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::get_all_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task_by_id)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_auth_routes))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    let static_files = ServeDir::new(&state.config.uploads.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(not_found.into_service());

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .fallback_service(static_files)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS: permissive for `*`, otherwise the configured origins with credentials
fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Fallback for anything no route or static file matched
async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    ApiError::not_found(format!("Not found - {}", uri.path())).into_response()
}

/// Session authentication middleware layer
///
/// Reads the session token from the `jwt` cookie, validates it and injects
/// [`SessionUser`] into request extensions.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

    let claims = session::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(SessionUser(claims.sub));

    Ok(next.run(req).await)
}
