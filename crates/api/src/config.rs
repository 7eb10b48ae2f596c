use std::path::PathBuf;

use schoolhub_core::comments::{
    CommentRateLimit, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS,
};
use schoolhub_core::media::DEFAULT_MAX_UPLOAD_BYTES;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining background tasks after the listener stops.
    pub shutdown_timeout_secs: u64,
    /// Directory uploaded files are written to.
    pub media_root: PathBuf,
    /// Public URL prefix under which `media_root` is served.
    pub media_url: String,
    /// Largest accepted upload in bytes.
    pub media_max_upload_bytes: usize,
    /// Per-user comment creation limit.
    pub comment_rate_limit: CommentRateLimit,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                    |
    /// | `MEDIA_ROOT`                     | `media`                 |
    /// | `MEDIA_URL`                      | `/media`                |
    /// | `MEDIA_MAX_UPLOAD_BYTES`         | `5242880`               |
    /// | `COMMENT_RATE_LIMIT_MAX`         | `5`                     |
    /// | `COMMENT_RATE_LIMIT_WINDOW_SECS` | `60`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let media_url = std::env::var("MEDIA_URL")
            .unwrap_or_else(|_| "/media".into())
            .trim_end_matches('/')
            .to_string();

        let media_max_upload_bytes: usize = std::env::var("MEDIA_MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MEDIA_MAX_UPLOAD_BYTES must be a valid usize");

        let max_comments: i64 = std::env::var("COMMENT_RATE_LIMIT_MAX")
            .unwrap_or_else(|_| DEFAULT_RATE_LIMIT_MAX.to_string())
            .parse()
            .expect("COMMENT_RATE_LIMIT_MAX must be a valid i64");

        let window_secs: i64 = std::env::var("COMMENT_RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| DEFAULT_RATE_LIMIT_WINDOW_SECS.to_string())
            .parse()
            .expect("COMMENT_RATE_LIMIT_WINDOW_SECS must be a valid i64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            media_root,
            media_url,
            media_max_upload_bytes,
            comment_rate_limit: CommentRateLimit {
                max_comments,
                window_secs,
            },
            jwt,
        }
    }

    /// Public URL for a path relative to the media root.
    pub fn media_url_for(&self, relative_path: &str) -> String {
        format!("{}/{}", self.media_url, relative_path.trim_start_matches('/'))
    }
}
