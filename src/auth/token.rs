use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::{ConfigError, JwtConfig};

/// Claim names the issuer always sets itself.
const RESERVED: [&str; 4] = ["iat", "exp", "iss", "aud"];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// JWT payload: registered claims set by the issuer plus whatever the caller supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub").and_then(Value::as_str)
    }
}

/// Signs and verifies HS256 bearer tokens. Built once at startup; the secret only
/// survives as the derived keys.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    default_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            // validate() bounds ttl_minutes to 0..=MAX_TTL_MINUTES
            default_ttl: Duration::from_secs(cfg.ttl_minutes.unsigned_abs() * 60),
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn issue(&self, mut claims: Map<String, Value>, ttl: Duration) -> anyhow::Result<String> {
        for name in RESERVED {
            claims.remove(name);
        }
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow::anyhow!("token ttl out of range: {ttl:?}"))?;
        let claims = Claims {
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            extra: claims,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(sub = ?claims.subject(), exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn issue_for_subject(&self, sub: &str) -> anyhow::Result<String> {
        let mut claims = Map::new();
        claims.insert("sub".into(), Value::String(sub.to_string()));
        self.issue(claims, self.default_ttl())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// A token is valid while `now < exp`; no leeway is granted.
    pub(crate) fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.exp <= now.unix_timestamp() {
            debug!(sub = ?data.claims.subject(), "jwt expired");
            return Err(TokenError::Expired);
        }
        debug!(sub = ?data.claims.subject(), "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_issuer(secret: &str, issuer: &str, audience: &str) -> TokenIssuer {
        TokenIssuer::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 30,
        })
        .expect("issuer should build")
    }

    fn keys() -> TokenIssuer {
        make_issuer("test-secret-key-that-is-32-bytes!!", "test-issuer", "test-aud")
    }

    fn claims(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn issue_then_verify_returns_original_claims() {
        let keys = keys();
        let original = claims(json!({ "sub": "a@x.com", "name": "A", "admin": false }));
        let token = keys.issue(original.clone(), keys.default_ttl()).unwrap();
        let verified = keys.verify(&token).expect("verify token");
        assert_eq!(verified.extra, original);
        assert_eq!(verified.subject(), Some("a@x.com"));
        assert_eq!(verified.iss, "test-issuer");
        assert_eq!(verified.aud, "test-aud");
        assert_eq!(verified.exp - verified.iat, 30 * 60);
    }

    #[test]
    fn zero_ttl_token_is_invalid_a_second_later() {
        let keys = keys();
        let token = keys
            .issue(claims(json!({ "sub": "a@x.com" })), Duration::ZERO)
            .unwrap();
        let later = OffsetDateTime::now_utc() + TimeDuration::seconds(1);
        assert!(matches!(keys.verify_at(&token, later), Err(TokenError::Expired)));
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let keys = keys();
        let token = keys
            .issue(claims(json!({ "sub": "a@x.com" })), Duration::from_secs(60))
            .unwrap();
        let claims = keys.verify(&token).unwrap();
        let at_exp = OffsetDateTime::from_unix_timestamp(claims.exp).unwrap();
        assert!(keys.verify_at(&token, at_exp - TimeDuration::seconds(1)).is_ok());
        assert!(matches!(keys.verify_at(&token, at_exp), Err(TokenError::Expired)));
    }

    #[test]
    fn out_of_range_ttl_is_an_error_not_an_expired_token() {
        let keys = keys();
        let err = keys
            .issue(claims(json!({ "sub": "a@x.com" })), Duration::MAX)
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        // Fits in i64 seconds but lands past the representable calendar.
        let ten_thousand_years = Duration::from_secs(10_000 * 366 * 24 * 60 * 60);
        assert!(keys
            .issue(claims(json!({ "sub": "a@x.com" })), ten_thousand_years)
            .is_err());
    }

    #[test]
    fn longest_configured_ttl_issues_a_valid_token() {
        let keys = TokenIssuer::new(&JwtConfig {
            secret: "test-secret-key-that-is-32-bytes!!".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: crate::config::MAX_TTL_MINUTES,
        })
        .expect("one year ttl is valid");
        let token = keys.issue_for_subject("a@x.com").expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, crate::config::MAX_TTL_MINUTES * 60);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = keys();
        let token = keys.issue_for_subject("a@x.com").unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let other = keys.issue_for_subject("mallory@x.com").unwrap();
        parts[1] = other.split('.').nth(1).unwrap().to_string();
        let forged = parts.join(".");
        assert!(matches!(keys.verify(&forged), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let ours = keys();
        let theirs = make_issuer("another-secret-key-also-32-bytes!!", "test-issuer", "test-aud");
        let token = theirs.issue_for_subject("a@x.com").unwrap();
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = keys();
        let bad = make_issuer("test-secret-key-that-is-32-bytes!!", "bad-iss", "bad-aud");
        let token = good.issue_for_subject("a@x.com").unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn reserved_claims_cannot_be_overridden() {
        let keys = keys();
        let token = keys
            .issue(
                claims(json!({ "sub": "a@x.com", "exp": 9_999_999_999i64, "iss": "evil" })),
                Duration::from_secs(60),
            )
            .unwrap();
        let verified = keys.verify(&token).unwrap();
        assert_eq!(verified.iss, "test-issuer");
        assert!(verified.exp < 9_999_999_999);
        assert!(!verified.extra.contains_key("exp"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys().verify("not.a.token").is_err());
        assert!(keys().verify("").is_err());
    }

    #[test]
    fn short_secret_fails_construction() {
        let err = TokenIssuer::new(&JwtConfig {
            secret: "short".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 30,
        })
        .err()
        .expect("short secret must be rejected");
        assert!(matches!(err, ConfigError::InvalidSecret(_)));
    }
}
