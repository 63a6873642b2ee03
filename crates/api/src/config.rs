use std::fmt::Debug;
use std::str::FromStr;

use hotspot_core::quota::{QuotaPolicy, DEFAULT_HOTSPOT_LIMIT};

use crate::auth::jwt::JwtConfig;

/// Settings the API server reads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; the editor front end in development.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Validation settings for the optional signed-in identity.
    pub jwt: JwtConfig,
    /// Hotspot cap for anonymous and free-plan actors.
    pub hotspot_limit: i64,
}

/// Parse `name` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} is not valid: {e:?}")),
        Err(_) => default,
    }
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `HOTSPOT_LIMIT`         | `10`                    |
    /// | `JWT_SECRET`            | required                |
    /// | `JWT_LEEWAY_SECS`       | `60`                    |
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let hotspot_limit: i64 = env_or("HOTSPOT_LIMIT", DEFAULT_HOTSPOT_LIMIT);
        assert!(hotspot_limit >= 0, "HOTSPOT_LIMIT must not be negative");

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            hotspot_limit,
        }
    }

    /// The quota policy every create is checked against.
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy::new(self.hotspot_limit)
    }
}
