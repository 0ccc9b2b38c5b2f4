use std::time::{Duration, SystemTime};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use josekit::{jws::JwsHeader, jwt::JwtPayload};

use crate::{error::JWTError, jwt::Jwt, key::SigningKey, random::random_token_id};

/// Claims carried by a session token handed to the mobile client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaim {
    /// SteamID64 of the signed-in user, stored as `sub`.
    pub identity: String,
    pub issuer: String,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaim {
    pub fn new(identity: impl Into<String>, issuer: impl Into<String>, lifetime: Duration) -> Result<Self, JWTError> {
        // numeric dates in a JWT carry whole seconds only
        let issued_at = Utc::now().trunc_subsecs(0);
        let lifetime = TimeDelta::from_std(lifetime).map_err(|_| JWTError::InvalidLifetime)?;
        if lifetime <= TimeDelta::zero() {
            return Err(JWTError::InvalidLifetime);
        }
        let expires_at = issued_at.checked_add_signed(lifetime).ok_or(JWTError::InvalidLifetime)?;

        Ok(Self {
            identity: identity.into(),
            issuer: issuer.into(),
            token_id: random_token_id(),
            issued_at,
            expires_at,
        })
    }

    pub fn sign(&self, key: &SigningKey) -> Result<Jwt, JWTError> {
        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        Jwt::new(header, self.into(), key)
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    pub fn validate(token: impl AsRef<str>, key: &SigningKey) -> Result<Self, JWTError> {
        let jwt = Jwt::decode(token, key)?;
        if jwt.is_expired() {
            return Err(JWTError::Expired);
        }

        jwt.payload().try_into()
    }
}

impl From<&SessionClaim> for JwtPayload {
    fn from(claim: &SessionClaim) -> Self {
        let mut payload = JwtPayload::new();
        payload.set_subject(&claim.identity);
        payload.set_issuer(&claim.issuer);
        payload.set_jwt_id(&claim.token_id);
        payload.set_issued_at(&SystemTime::from(claim.issued_at));
        payload.set_expires_at(&SystemTime::from(claim.expires_at));
        payload
    }
}

impl TryFrom<&JwtPayload> for SessionClaim {
    type Error = JWTError;

    fn try_from(payload: &JwtPayload) -> Result<Self, Self::Error> {
        let identity = payload.subject().ok_or(JWTError::MissingClaim("sub"))?.to_owned();
        let issuer = payload.issuer().ok_or(JWTError::MissingClaim("iss"))?.to_owned();
        let token_id = payload.jwt_id().ok_or(JWTError::MissingClaim("jti"))?.to_owned();
        let issued_at = payload.issued_at().ok_or(JWTError::MissingClaim("iat"))?;
        let expires_at = payload.expires_at().ok_or(JWTError::MissingClaim("exp"))?;

        Ok(SessionClaim {
            identity,
            issuer,
            token_id,
            issued_at: DateTime::<Utc>::from(issued_at),
            expires_at: DateTime::<Utc>::from(expires_at),
        })
    }
}
