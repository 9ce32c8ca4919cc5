use crate::error::BackendError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    exp: u64,
    #[serde(default)]
    sub: Option<String>,
}

/// Bearer token issued by wallet login.
///
/// Only the `exp` and `sub` claims are read. The signature belongs to the backend
/// and is not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    expires_at_epoch_s: u64,
    subject: Option<String>,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, BackendError> {
        let token = token.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<SessionClaims>(&token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|err| BackendError::InvalidToken(err.to_string()))?
            .claims;

        Ok(Self {
            token,
            expires_at_epoch_s: claims.exp,
            subject: claims.sub,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn expires_at_epoch_s(&self) -> u64 {
        self.expires_at_epoch_s
    }

    pub fn is_expired_at(&self, now_epoch_s: u64) -> bool {
        now_epoch_s >= self.expires_at_epoch_s
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(jsonwebtoken::get_current_timestamp())
    }
}
