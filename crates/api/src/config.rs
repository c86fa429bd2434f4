//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//! - `RECIPES_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; only needed with the `postgres` store)
//!
//! ## Optional
//! - `RECIPES_STORE` - `postgres` (default) or `memory`
//! - `JWT_EXPIRE` - Token lifetime such as `7d`, `12h`, `30m` or `3600` (default: 7d)
//! - `RECIPES_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Shannon entropy floor, in bits per character, for the signing secret.
const MIN_SECRET_ENTROPY: f64 = 3.3;
const DEFAULT_TOKEN_TTL: &str = "7d";

/// Fragments that betray a copy-pasted sample value.
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "changeme",
    "change-me",
    "change_me",
    "your-",
    "your_",
    "example",
    "placeholder",
    "secret",
    "password",
    "jwt",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which record store backs the service.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Process-local collections; data is lost on restart.
    Memory,
    /// `PostgreSQL` tables.
    Postgres { database_url: SecretString },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    pub port: u16,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: SecretString,
    /// Bearer token lifetime
    pub token_ttl: Duration,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = match env_or("RECIPES_STORE", "postgres").as_str() {
            "memory" => StoreConfig::Memory,
            "postgres" => StoreConfig::Postgres {
                database_url: env_var("RECIPES_DATABASE_URL")
                    .or_else(|| env_var("DATABASE_URL"))
                    .map(SecretString::from)
                    .ok_or_else(|| ConfigError::MissingEnvVar("RECIPES_DATABASE_URL".into()))?,
            },
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "RECIPES_STORE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };

        let host = env_or("RECIPES_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RECIPES_HOST".to_string(), e.to_string()))?;
        let port = env_or("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let jwt_secret = env_var("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".into()))
            .and_then(check_jwt_secret)?;

        let token_ttl = parse_duration(&env_or("JWT_EXPIRE", DEFAULT_TOKEN_TTL))
            .map_err(|e| ConfigError::InvalidEnvVar("JWT_EXPIRE".to_string(), e))?;

        let log_format = match env_var("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            store,
            host,
            port,
            jwt_secret,
            token_ttl,
            sentry_dsn: env_var("SENTRY_DSN"),
            sentry_environment: env_var("SENTRY_ENVIRONMENT"),
            log_format,
        })
    }

    /// Configuration for tests and local demos: memory store, ephemeral port.
    #[must_use]
    pub fn for_memory(jwt_secret: SecretString) -> Self {
        Self {
            store: StoreConfig::Memory,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            jwt_secret,
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            sentry_dsn: None,
            sentry_environment: None,
            log_format: LogFormat::Text,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a token lifetime: `<n>` seconds or `<n>` followed by `s`, `m`, `h` or `d`.
///
/// # Errors
///
/// Returns a description of the problem for empty, zero or malformed values.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let (digits, unit_secs) = match raw.char_indices().last() {
        Some((i, 's')) => (raw.get(..i), 1),
        Some((i, 'm')) => (raw.get(..i), 60),
        Some((i, 'h')) => (raw.get(..i), 60 * 60),
        Some((i, 'd')) => (raw.get(..i), 24 * 60 * 60),
        Some(_) => (Some(raw), 1),
        None => return Err("duration is empty".to_string()),
    };

    let amount = digits
        .unwrap_or_default()
        .parse::<u64>()
        .map_err(|_| format!("'{raw}' is not a duration like 7d, 12h, 30m or 3600"))?;
    if amount == 0 {
        return Err("duration must be positive".to_string());
    }

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("'{raw}' is too large"))
}

/// A set, non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_owned())
}

/// Bits of Shannon entropy per character.
fn entropy_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    counts
        .into_values()
        .map(|n| f64::from(n) / f64::from(total))
        .map(|p| -p * p.log2())
        .sum()
}

/// Reject short, sample-looking or low-entropy signing secrets.
fn check_jwt_secret(raw: String) -> Result<SecretString, ConfigError> {
    let insecure = |why: String| ConfigError::InsecureSecret("JWT_SECRET".into(), why);

    let length = raw.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {length})"
        )));
    }

    let lower = raw.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS.iter().find(|f| lower.contains(**f)) {
        return Err(insecure(format!("looks like a placeholder (contains '{fragment}')")));
    }

    let entropy = entropy_per_char(&raw);
    if entropy < MIN_SECRET_ENTROPY {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need {MIN_SECRET_ENTROPY:.1}); generate it randomly"
        )));
    }

    Ok(SecretString::from(raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_per_char() {
        assert!(entropy_per_char("").abs() < f64::EPSILON);
        assert!(entropy_per_char("zzzz").abs() < f64::EPSILON);
        assert!((entropy_per_char("abab") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jwt_secret_checks() {
        let reason = |raw: &str| match check_jwt_secret(raw.to_owned()) {
            Err(ConfigError::InsecureSecret(var, why)) => {
                assert_eq!(var, "JWT_SECRET");
                why
            }
            other => panic!("expected InsecureSecret, got {other:?}"),
        };

        assert!(reason("k7P$w2Qz!9mR").starts_with("must be at least 32"));
        assert!(reason("please-change-me-before-deploying-this").contains("change-me"));
        assert!(reason(&"ab".repeat(20)).starts_with("entropy too low"));
        assert!(check_jwt_secret("k7P$w2Qz!9mRx4Lb@t6Nc#8Vh3Jd&5Fs".to_owned()).is_ok());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration(" 3600 ").unwrap(), Duration::from_secs(3_600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0d").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("7w").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = ApiConfig::for_memory(SecretString::from("x".repeat(32)));
        config.port = 3000;
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ApiConfig::for_memory(SecretString::from("super_private_signing_key_value!"));
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super_private_signing_key_value!"));
    }
}
