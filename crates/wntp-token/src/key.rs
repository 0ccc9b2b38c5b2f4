use std::fmt::{Debug, Formatter};

use josekit::jws::{
    alg::hmac::{HmacJwsSigner, HmacJwsVerifier},
    HS256,
};
use zeroize::Zeroizing;

use crate::error::JWTError;

pub const MINIMUM_SECRET_LENGTH: usize = 32;

/// Process-wide HS256 secret shared by the issuer and every relying party.
#[derive(Clone)]
pub struct SigningKey {
    secret: Zeroizing<Vec<u8>>,
}

impl SigningKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, JWTError> {
        let secret = secret.as_ref();
        if secret.len() < MINIMUM_SECRET_LENGTH {
            return Err(JWTError::WeakSecret(MINIMUM_SECRET_LENGTH));
        }

        Ok(Self { secret: Zeroizing::new(secret.to_vec()) })
    }

    pub fn signer(&self) -> Result<HmacJwsSigner, JWTError> {
        HS256.signer_from_bytes(self.secret.as_slice()).map_err(JWTError::JoseCreationError)
    }

    pub fn verifier(&self) -> Result<HmacJwsVerifier, JWTError> {
        HS256.verifier_from_bytes(self.secret.as_slice()).map_err(JWTError::VerifierCreationError)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::{SigningKey, MINIMUM_SECRET_LENGTH};
    use crate::error::JWTError;

    #[test]
    fn when_secret_is_too_short_key_creation_should_fail() {
        let result = SigningKey::new("short");

        assert!(matches!(result, Err(JWTError::WeakSecret(MINIMUM_SECRET_LENGTH))));
    }

    #[test]
    fn when_secret_is_empty_key_creation_should_fail() {
        assert!(SigningKey::new("").is_err());
    }

    #[test]
    fn debug_output_does_not_leak_the_secret() {
        let key = SigningKey::new("0123456789abcdef0123456789abcdef").expect("creating key should be successful");

        assert!(!format!("{key:?}").contains("0123456789abcdef"));
    }
}
