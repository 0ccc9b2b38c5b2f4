use std::fmt::Debug;

use josekit::JoseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JWTError {
    #[error("invalid JWT format '{0}'")]
    InvalidJwtFormat(String),

    #[error("error while creating JWT")]
    JoseCreationError(#[from] JoseError),

    #[error("error while creating JWS verifier")]
    VerifierCreationError(JoseError),

    #[error("invalid JWS Signature")]
    InvalidSignature(JoseError),

    #[error("missing claim '{0}'")]
    MissingClaim(&'static str),

    #[error("the token has expired")]
    Expired,

    #[error("signing secret must be at least {0} bytes long")]
    WeakSecret(usize),

    #[error("token lifetime is out of range")]
    InvalidLifetime,
}
