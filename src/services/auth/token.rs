use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::Identity;
use crate::services::users::{Role, UserRecord};

// Errors returned by access-token verification + claim validation.
// Callers collapse all of them into a single 401.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid 'sub' (expected UUID)")]
    InvalidSubUuid,
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
}

/// Access token (JWT) claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

/// HS256 access-token issuer and verifier sharing one process-wide secret.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Sign an access token for `user`, valid for the configured ttl.
    pub fn issue(&self, user: &UserRecord) -> Result<IssuedToken, AppError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                AppError::unexpected(format!("token ttl out of range: {}", self.ttl_seconds))
            })?;
        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now,
            exp,
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
        })
    }

    pub fn sign(&self, claims: &AccessTokenClaims) -> Result<String, AppError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::unexpected(format!("failed to sign JWT: {e}"))
        })
    }

    /// Verify signature and expiry, then turn the claims into an `Identity`.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )?;
        let claims = data.claims;

        let subject = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::InvalidSubUuid)?;
        let expires_at: DateTime<Utc> =
            DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::InvalidClaim("exp"))?;

        Ok(Identity::new(subject, claims.role, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            password_hash: "$2b$04$not-a-real-hash".into(),
            role,
            created_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(SECRET, 3600, 0)
    }

    #[test]
    fn issued_token_verifies_to_same_subject_and_role() {
        let svc = service();
        let alice = user(Role::Admin);

        let issued = svc.issue(&alice).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let identity = svc.verify(&issued.token).unwrap();
        assert_eq!(identity.subject, alice.id);
        assert!(identity.is_admin());
        assert!(identity.expires_at > Utc::now());
    }

    #[test]
    fn out_of_range_ttl_fails_instead_of_wrapping() {
        let svc = TokenService::new(SECRET, u64::MAX, 0);
        assert!(matches!(
            svc.issue(&user(Role::User)),
            Err(AppError::Unexpected(_))
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = TokenService::new("another_secret", 3600, 0);
        let issued = other.issue(&user(Role::User)).unwrap();

        assert!(service().verify(&issued.token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc
            .sign(&AccessTokenClaims {
                sub: Uuid::new_v4().to_string(),
                role: Role::User,
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Jwt(_))));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc
            .sign(&AccessTokenClaims {
                sub: "42".into(),
                role: Role::User,
                iat: now,
                exp: now + 60,
            })
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::InvalidSubUuid)));
    }

    #[test]
    fn garbage_and_tampered_tokens_are_rejected() {
        let svc = service();
        assert!(svc.verify("invalid.token.here").is_err());
        assert!(svc.verify("").is_err());

        let issued = svc.issue(&user(Role::User)).unwrap();
        let mut tampered = issued.token.clone();
        tampered.push('x');
        assert!(svc.verify(&tampered).is_err());
    }

    #[test]
    fn missing_role_claim_defaults_to_user() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": Uuid::new_v4().to_string(),
            "iat": now,
            "exp": now + 60,
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let identity = svc.verify(&token).unwrap();
        assert_eq!(identity.role, Role::User);
    }
}
