use std::fmt;

use thiserror::Error;

/// Shortest HS256 secret the service accepts.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest access-token lifetime the service accepts (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("invalid JWT secret: {0}")]
    InvalidSecret(String),
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

// Keep the signing secret out of logs and panic messages.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::InvalidSecret("secret is empty".into()));
        }
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidSecret(format!(
                "secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if !(0..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            return Err(ConfigError::Invalid {
                var: "JWT_TTL_MINUTES",
                value: self.ttl_minutes.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Optional values fall back
    /// to defaults when absent, but a present value that does not parse is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));
        let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.into());

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: or_default("JWT_ISSUER", "blog-api"),
            audience: or_default("JWT_AUDIENCE", "blog-api-users"),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 30)?,
        };
        jwt.validate()?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            host: or_default("APP_HOST", "0.0.0.0"),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            jwt,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
        ]))
        .expect("config should load");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.jwt.ttl_minutes, 30);
        assert_eq!(cfg.jwt.issuer, "blog-api");
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/blog",
        )]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", "too-short"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSecret(_)));
    }

    #[test]
    fn malformed_number_is_not_silently_defaulted() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", "half an hour"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "JWT_TTL_MINUTES", .. }));
    }

    #[test]
    fn ttl_beyond_a_year_is_rejected_at_startup() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", "10000000000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "JWT_TTL_MINUTES", .. }));

        let negative = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", "-1"),
        ]))
        .unwrap_err();
        assert!(matches!(negative, ConfigError::Invalid { var: "JWT_TTL_MINUTES", .. }));
    }

    #[test]
    fn ttl_of_exactly_a_year_is_accepted() {
        let one_year = MAX_TTL_MINUTES.to_string();
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/blog"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", one_year.as_str()),
        ]))
        .expect("one year is allowed");
        assert_eq!(cfg.jwt.ttl_minutes, MAX_TTL_MINUTES);
    }

    #[test]
    fn startup_errors_travel_through_anyhow() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).unwrap_err();
        let err = anyhow::Error::from(err).context("loading configuration");
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn debug_output_redacts_secret() {
        let jwt = JwtConfig {
            secret: SECRET.into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 30,
        };
        let rendered = format!("{jwt:?}");
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
