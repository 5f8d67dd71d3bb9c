/// Configuration management for the API server
///
/// Loaded once at startup from environment variables and handed to the
/// router inside [`AppState`](crate::app::AppState). Nothing reads the
/// environment after that.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `JWT_SECRET`: Secret key for session token signing (required, >= 32 chars)
/// - `SESSION_TTL_SECONDS`: Session token lifetime (default: 3600)
/// - `APP_ENV` / `NODE_ENV`: `development` drops the cookie `Secure` flag (default: production)
/// - `PUBLIC_DIR`: Static file root; photos go to `<PUBLIC_DIR>/uploads` (default: public)
/// - `PUBLIC_BASE_URL`: Used for photo links when a request has no Host header
/// - `MAX_UPLOAD_BYTES`: Request body limit for photo uploads (default: 5 MiB)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use taskboard_shared::auth::session;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub uploads: UploadConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,

    /// False only when running with `APP_ENV=development`
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 signing secret, at least 32 bytes
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_seconds: i64,

    /// Whether the session cookie carries the `Secure` attribute
    pub secure_cookie: bool,
}

/// Photo upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root of the statically served directory
    pub public_dir: PathBuf,

    /// Fallback origin for photo URLs, e.g. `https://api.example.com`
    pub public_base_url: Option<String>,

    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a numeric value
    /// doesn't parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let app_env = env::var("APP_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "production".to_string());
        let production = !is_development(&app_env);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_seconds = match env::var("SESSION_TTL_SECONDS") {
            Ok(raw) => raw.parse::<i64>()?,
            Err(_) => session::default_ttl().num_seconds(),
        };

        let public_dir = PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()));
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "5242880".to_string())
            .parse::<usize>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_seconds,
                secure_cookie: production,
            },
            uploads: UploadConfig {
                public_dir,
                public_base_url,
                max_upload_bytes,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Directory uploaded photos are written to and served from
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads.public_dir.join("uploads")
    }

    /// Session token lifetime
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session.ttl_seconds)
    }
}

fn is_development(app_env: &str) -> bool {
    app_env.eq_ignore_ascii_case("development")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
