use std::time::SystemTime;

use josekit::jws::JwsHeader;
use josekit::jwt;
use josekit::jwt::JwtPayload;
use josekit::JoseError;

use super::error::JWTError;
use super::key::SigningKey;

#[derive(Debug, Clone)]
pub struct Jwt {
    header: JwsHeader,
    payload: JwtPayload,
    serialized_repr: String,
}

impl Jwt {
    pub fn new(header: JwsHeader, payload: JwtPayload, key: &SigningKey) -> Result<Self, JWTError> {
        let signer = key.signer()?;
        let result = jwt::encode_with_signer(&payload, &header, &signer).map_err(JWTError::JoseCreationError)?;
        Ok(Jwt { header, payload, serialized_repr: result })
    }

    /// Decodes a compact JWS and checks its signature. Expiry is not checked here.
    pub fn decode(input: impl AsRef<str>, key: &SigningKey) -> Result<Self, JWTError> {
        let str_jwt = input.as_ref();
        let verifier = key.verifier()?;

        let (payload, header) = jwt::decode_with_verifier(str_jwt, &verifier).map_err(|e| match e {
            JoseError::InvalidSignature(_) => JWTError::InvalidSignature(e),
            _ => JWTError::InvalidJwtFormat(str_jwt.to_owned()),
        })?;

        Ok(Jwt { header, payload, serialized_repr: str_jwt.to_owned() })
    }

    pub fn is_expired(&self) -> bool {
        self.payload.expires_at().map_or(true, |exp| exp < SystemTime::now())
    }

    pub fn token_type(&self) -> Option<&str> {
        self.header.token_type()
    }

    pub fn payload(&self) -> &JwtPayload {
        &self.payload
    }

    pub fn as_str(&self) -> &str {
        &self.serialized_repr
    }
}
