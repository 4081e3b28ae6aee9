//! Runtime configuration for the session core and gateway.
//! Values come from `MEDHIRE_*` environment variables with sensible defaults;
//! cookies are Secure everywhere except explicit local development.

use tracing::info;

pub const DEFAULT_COOKIE_DAYS: i64 = 7;
pub const DEFAULT_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Auth cookie lifetime in days. One expiry for the whole auth triple.
    pub cookie_days: i64,
    pub cookie_path: String,
    /// Secure attribute on every cookie; off only in local development.
    pub secure_cookies: bool,
    pub environment: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_days: DEFAULT_COOKIE_DAYS,
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            secure_cookies: true,
            environment: "production".to_string(),
        }
    }
}

impl SessionConfig {
    /// Build from `MEDHIRE_ENV` and `MEDHIRE_COOKIE_DAYS`.
    pub fn from_env() -> Self {
        let environment = std::env::var("MEDHIRE_ENV").unwrap_or_else(|_| "production".to_string());
        let cookie_days = std::env::var("MEDHIRE_COOKIE_DAYS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(DEFAULT_COOKIE_DAYS);
        let secure_cookies = environment != "development";
        info!(
            target: "medhire",
            "session config: env='{}', cookie_days={}, secure_cookies={}",
            environment, cookie_days, secure_cookies
        );
        Self {
            cookie_days,
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            secure_cookies,
            environment,
        }
    }

    pub fn is_development(&self) -> bool { self.environment == "development" }

    /// Local-development variant used by tests and the dev gateway.
    pub fn development() -> Self {
        Self {
            secure_cookies: false,
            environment: "development".to_string(),
            ..Self::default()
        }
    }
}
