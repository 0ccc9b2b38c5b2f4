use std::time::Duration;

use bon::Builder;
#[cfg(test)]
use mockall::automock;
use tracing::info;
use wntp_token::{claim::SessionClaim, error::JWTError, jwt::Jwt, key::SigningKey};

use super::openid::VerifiedIdentity;

/// Mints session tokens. Callers must only pass identities produced by the assertion verifier.
#[cfg_attr(test, automock)]
pub trait SessionIssuer {
    fn issue(&self, identity: &VerifiedIdentity) -> Result<Jwt>;
}

#[derive(Builder)]
#[builder(on(String, into))]
pub struct JwtSessionIssuerConfig {
    secret: String,
    lifetime: Duration,
    issuer: String,
}

pub struct JwtSessionIssuer {
    key: SigningKey,
    lifetime: Duration,
    issuer: String,
}

impl JwtSessionIssuer {
    pub fn new(config: JwtSessionIssuerConfig) -> Result<Self> {
        if config.lifetime.is_zero() {
            return Err(JWTError::InvalidLifetime.into());
        }

        Ok(Self { key: SigningKey::new(config.secret.as_bytes())?, lifetime: config.lifetime, issuer: config.issuer })
    }
}

impl SessionIssuer for JwtSessionIssuer {
    fn issue(&self, identity: &VerifiedIdentity) -> Result<Jwt> {
        let claim = SessionClaim::new(identity.as_str(), self.issuer.as_str(), self.lifetime)?;
        let token = claim.sign(&self.key)?;

        info!(
            identity = %identity,
            token_id = %claim.token_id,
            expires_at = %claim.expires_at,
            "issued session token"
        );

        Ok(token)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Token(#[from] JWTError),
}

pub type Result<T> = std::result::Result<T, Error>;
