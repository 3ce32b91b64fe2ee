use actix_web::cookie::Cookie;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::AppError;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// How long an issued token stays valid
pub fn token_validity() -> Duration {
    Duration::hours(5)
}

/// Identity posted to `/jwt` plus the validity window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: Map<String, Value>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.identity.get("email").and_then(Value::as_str)
    }
}

/// Issues and verifies the signed session tokens.
/// Tokens are stateless, nothing is kept server side.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl SessionTokens {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_validity(secret, token_validity())
    }

    pub fn with_validity(secret: &[u8], validity: Duration) -> Self {
        // the identity is whatever the client posted, an `aud` key in it is just data
        let mut validation = Validation::default();
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            validity,
        }
    }

    /// Signs `identity` into a token
    pub fn issue(&self, mut identity: Map<String, Value>) -> Result<String, AppError> {
        // these are ours to set
        identity.remove("iat");
        identity.remove("exp");

        let now = Utc::now();
        let claims = Claims {
            identity,
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::Internal(err.to_string()))
    }

    /// Checks signature and expiry. Every failure is reported the same way.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!("Token verification failed: {}", err);
                AppError::Unauthorized
            })
    }

    /// HTTP-only session cookie, without an expiry so it dies with the browser session
    pub fn cookie(token: String) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(false)
            .finish()
    }

    pub fn removal_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(TOKEN_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(false)
            .finish();
        cookie.make_removal();

        cookie
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn identity(email: &str) -> Map<String, Value> {
        match json!({ "email": email, "name": "Ann" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = SessionTokens::new(b"secret");
        let token = tokens.issue(identity("a@b.com")).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email(), Some("a@b.com"));
        assert_eq!(claims.exp - claims.iat, token_validity().num_seconds());
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let tokens = SessionTokens::with_validity(b"secret", Duration::hours(-1));
        let token = tokens.issue(identity("a@b.com")).unwrap();

        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_tampered_token_is_unauthorized() {
        let tokens = SessionTokens::new(b"secret");
        let token = tokens.issue(identity("a@b.com")).unwrap();

        let other = SessionTokens::new(b"another secret");
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized)));

        let mut parts = token.split('.').map(str::to_string).collect::<Vec<_>>();
        parts[1] = tokens
            .issue(identity("evil@b.com"))
            .unwrap()
            .split('.')
            .nth(1)
            .unwrap()
            .to_string();
        let forged = parts.join(".");
        assert!(matches!(tokens.verify(&forged), Err(AppError::Unauthorized)));

        assert!(matches!(tokens.verify("garbage"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_client_cannot_extend_expiry() {
        let tokens = SessionTokens::new(b"secret");
        let mut ident = identity("a@b.com");
        ident.insert("exp".into(), json!(i64::MAX));

        let claims = tokens.verify(&tokens.issue(ident).unwrap()).unwrap();
        assert!(claims.exp < i64::MAX);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = SessionTokens::cookie("abc".into());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert!(cookie.expires().is_none());
        assert!(cookie.max_age().is_none());
    }
}
