//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs signed with a shared secret (`AUTH_SECRET`).
//! The `role` claim gates admin routes; everything else only needs a
//! valid subject.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Role claim value that unlocks admin routes.
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an API bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity)
    pub sub: String,
    /// Role; absent for regular callers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Verifies and issues HS256 bearer tokens.
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier over a shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a bearer token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {}", e)))
    }

    /// Issue a token for a subject. Used by operator tooling and tests.
    pub fn issue(
        &self,
        sub: &str,
        role: Option<&str>,
        ttl: Duration,
    ) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            role: role.map(|r| r.to_string()),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
    }
}

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub role: Option<String>,
}

impl AuthUser {
    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    /// Reject non-admin callers.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            role: claims.role,
        }
    }
}

/// Axum extractor for authenticated callers.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.verifier.verify(token)?;

        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let verifier = TokenVerifier::new("test-secret");
        let token = verifier
            .issue("user-1", None, Duration::from_secs(300))
            .expect("issue token");

        let claims = verifier.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "user-1");
        assert!(claims.role.is_none());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_claim_survives_roundtrip() {
        let verifier = TokenVerifier::new("test-secret");
        let token = verifier
            .issue("ops", Some(ADMIN_ROLE), Duration::from_secs(300))
            .expect("issue token");

        let user = AuthUser::from(verifier.verify(&token).expect("verify token"));
        assert!(user.is_admin());
        assert!(user.require_admin().is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenVerifier::new("secret-a");
        let verifier = TokenVerifier::new("secret-b");

        let token = issuer
            .issue("user-1", None, Duration::from_secs(300))
            .expect("issue token");

        let err = verifier.verify(&token).expect_err("must reject");
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let verifier = TokenVerifier::new("test-secret");
        assert!(matches!(
            verifier.verify("not.a.jwt"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_non_admin_forbidden() {
        let user = AuthUser {
            uid: "user-1".to_string(),
            role: Some("viewer".to_string()),
        };
        assert!(!user.is_admin());
        assert!(matches!(user.require_admin(), Err(ApiError::Forbidden(_))));
    }
}
