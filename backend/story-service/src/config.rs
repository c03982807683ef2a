/// Configuration management for Story Service
///
/// Configuration is read from environment variables; `main` loads a `.env`
/// file first when one is present.
use serde::{Deserialize, Serialize};

const DEV_JWT_SECRET: &str = "story-service-dev-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Bearer-token validation
    pub auth: AuthConfig,
    /// Story endpoint behaviour
    pub stories: StoriesConfig,
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
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret
    pub jwt_secret: String,
    /// Required `iss` claim, if any
    pub jwt_issuer: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

/// Story endpoint behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoriesConfig {
    /// Render store failures on per-user listing and search as 404
    pub list_errors_as_not_found: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: lookup("STORY_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or_default(&lookup, "STORY_SERVICE_PORT", 8085)?,
                json_logs: lookup("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            cors: {
                let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
                    Some(value) => value,
                    None if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    None => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgresql://localhost/stories".to_string()),
                max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: parse_or_default(
                    &lookup,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    10,
                )?,
            },
            auth: {
                let jwt_secret = match lookup("JWT_SECRET") {
                    Some(secret) if !secret.trim().is_empty() => secret,
                    _ if production => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    _ => DEV_JWT_SECRET.to_string(),
                };
                AuthConfig {
                    jwt_secret,
                    jwt_issuer: lookup("JWT_ISSUER").filter(|v| !v.trim().is_empty()),
                }
            },
            stories: StoriesConfig {
                list_errors_as_not_found: parse_or_default(
                    &lookup,
                    "STORIES_LIST_ERRORS_AS_NOT_FOUND",
                    true,
                )?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn development_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.bind_address(), "0.0.0.0:8085");
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert!(config.auth.jwt_issuer.is_none());
        assert!(config.stories.list_errors_as_not_found);
        assert!(!config.app.json_logs);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("STORY_SERVICE_PORT", "9090"),
            ("DATABASE_MAX_CONNECTIONS", "32"),
            ("STORIES_LIST_ERRORS_AS_NOT_FOUND", "false"),
            ("LOG_FORMAT", "JSON"),
            ("JWT_ISSUER", "stories-auth"),
        ])
        .unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.database.max_connections, 32);
        assert!(!config.stories.list_errors_as_not_found);
        assert!(config.app.json_logs);
        assert_eq!(config.auth.jwt_issuer.as_deref(), Some("stories-auth"));
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = load(&[("STORY_SERVICE_PORT", "eighty")]).unwrap_err();
        assert!(err.contains("STORY_SERVICE_PORT"));
    }

    #[test]
    fn production_requires_secret_and_origins() {
        let missing_secret = load(&[
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://stories.example.com"),
        ]);
        assert!(missing_secret.unwrap_err().contains("JWT_SECRET"));

        let wildcard = load(&[
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("JWT_SECRET", "s3cret"),
        ]);
        assert!(wildcard.unwrap_err().contains("CORS_ALLOWED_ORIGINS"));

        assert!(load(&[
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", "https://stories.example.com"),
            ("JWT_SECRET", "s3cret"),
        ])
        .is_ok());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&[("JWT_SECRET", "hunter2")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
