//! HS256 token decoding + validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};
use crate::principal::Principal;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token decoding failed: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Decodes a bearer token into an authenticated [`Principal`].
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, JwtError>;
}

/// HS256 shared-secret validator.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claims carry RFC3339 timestamps validated by `validate_claims`, not
        // the numeric `exp`/`iat` jsonwebtoken expects.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, JwtError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;

        Ok(Principal {
            user_id: data.claims.sub,
            role: data.claims.role,
            name: data.claims.name,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use chrono::Duration;
    use dovic_core::UserId;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_claims(role: Role) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: UserId::new(),
            role,
            name: Some("Test User".to_string()),
            email: Some("test@example.com".to_string()),
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn valid_token_yields_principal() {
        let claims = fresh_claims(Role::Admin);
        let token = mint("secret", &claims);

        let validator = Hs256JwtValidator::new(b"secret");
        let principal = validator.validate(&token, Utc::now()).unwrap();
        assert_eq!(principal.user_id, claims.sub);
        assert!(principal.is_admin());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = mint("secret", &fresh_claims(Role::Customer));
        let validator = Hs256JwtValidator::new(b"other-secret");
        assert!(validator.validate(&token, Utc::now()).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = fresh_claims(Role::Customer);
        claims.expires_at = Utc::now() - Duration::minutes(1);
        let token = mint("secret", &claims);

        let validator = Hs256JwtValidator::new(b"secret");
        match validator.validate(&token, Utc::now()) {
            Err(JwtError::Claims(TokenValidationError::Expired)) => {}
            other => panic!("expected expired claims error, got {other:?}"),
        }
    }
}
