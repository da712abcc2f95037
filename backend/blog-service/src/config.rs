/// Configuration management for Blog Service
///
/// Everything comes from environment variables (a `.env` file is loaded by
/// `main` first). Production refuses to start with permissive CORS or
/// without a Google client id.
use crate::services::DEFAULT_GOOGLE_TOKENINFO_URL;
use serde::{Deserialize, Serialize};

const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration; `None` runs on the in-memory store
    pub database: Option<DatabaseConfig>,
    /// Session token configuration
    pub auth: AuthConfig,
    /// Google identity provider
    pub google: GoogleConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON log lines
    pub json_logs: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub private_key_pem: String,
    pub public_key_pem: String,
    pub session_ttl_secs: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("private_key_pem", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub tokeninfo_url: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app = AppConfig {
            env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: var("BLOG_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match var("BLOG_SERVICE_PORT") {
                Some(p) => p
                    .parse()
                    .map_err(|_| format!("BLOG_SERVICE_PORT is not a valid port: {p}"))?,
                None => 8080,
            },
            json_logs: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        };
        let production = app.is_production();

        let cors = {
            let allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
                Some(value) => value,
                None if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                None => "http://localhost:5173,http://localhost:3000".to_string(),
            };

            if production && allowed_origins.split(',').any(|o| o.trim() == "*") {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|c| c.parse().ok())
                .unwrap_or(10),
        });

        let auth = AuthConfig {
            private_key_pem: var("JWT_PRIVATE_KEY_PEM")
                .map(|k| normalize_pem(&k))
                .ok_or_else(|| "JWT_PRIVATE_KEY_PEM must be set".to_string())?,
            public_key_pem: var("JWT_PUBLIC_KEY_PEM")
                .map(|k| normalize_pem(&k))
                .ok_or_else(|| "JWT_PUBLIC_KEY_PEM must be set".to_string())?,
            session_ttl_secs: match var("SESSION_TOKEN_TTL_SECS") {
                Some(v) => match v.parse::<i64>() {
                    Ok(secs) if (1..=MAX_SESSION_TTL_SECS).contains(&secs) => secs,
                    _ => {
                        return Err(format!(
                            "SESSION_TOKEN_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}: {v}"
                        ))
                    }
                },
                None => DEFAULT_SESSION_TTL_SECS,
            },
        };

        let google = GoogleConfig {
            client_id: var("GOOGLE_CLIENT_ID"),
            tokeninfo_url: var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|| DEFAULT_GOOGLE_TOKENINFO_URL.to_string()),
        };
        if production && google.client_id.is_none() {
            return Err("GOOGLE_CLIENT_ID must be set in production".to_string());
        }

        Ok(Config {
            app,
            cors,
            database,
            auth,
            google,
        })
    }
}

/// PEM keys in env files usually carry literal `\n` sequences
fn normalize_pem(raw: &str) -> String {
    raw.trim().replace("\\n", "\n")
}
