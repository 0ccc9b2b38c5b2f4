//! Steam speaks OpenID 2.0, not OpenID Connect.
//!
//! A user is sent to Steam with a `checkid_setup` request (see [`login`]), signs in there,
//! and is redirected back to our callback with an assertion encoded as `openid.*` query
//! parameters. The claimed identifier of that assertion carries the user's SteamID64.
//! Query parameters can be forged by anyone, so an assertion is only trusted after Steam
//! confirms it through a `check_authentication` round trip (see [`authentication`]).

use std::{collections::HashMap, fmt::Display, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use self::authentication::{AssertionAuthenticator, Error as AuthenticatorError};

pub(crate) mod authentication;
pub(crate) mod login;

pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";
pub const MODE_KEY: &str = "openid.mode";
pub const CLAIMED_ID_KEY: &str = "openid.claimed_id";
pub const IDENTITY_KEY: &str = "openid.identity";
pub const RETURN_TO_KEY: &str = "openid.return_to";
pub const ID_RES_MODE: &str = "id_res";

const OPENID_PARAMETER_PREFIX: &str = "openid.";

/// Parameters of a positive or negative assertion as received on the callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assertion(HashMap<String, String>);

impl Assertion {
    /// Builds an assertion from raw query pairs. The first value of a repeated key wins.
    pub fn from_query_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut parameters = HashMap::new();
        for (key, value) in pairs {
            parameters.entry(key).or_insert(value);
        }

        Self(parameters)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn openid_parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(key, _)| key.starts_with(OPENID_PARAMETER_PREFIX))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// SteamID64 taken from an assertion that passed every check of [`AssertionVerifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity(String);

impl VerifiedIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn for_test(identity: &str) -> Self {
        Self(identity.to_owned())
    }
}

impl Display for VerifiedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct AssertionVerifier {
    identity_host: String,
    return_to: Url,
    authenticator: Arc<dyn AssertionAuthenticator + Send + Sync>,
}

impl AssertionVerifier {
    /// `return_to` is our own callback URL; assertions addressed anywhere else are refused.
    pub fn new(
        identity_host: impl Into<String>,
        return_to: Url,
        authenticator: Arc<dyn AssertionAuthenticator + Send + Sync>,
    ) -> Self {
        Self { identity_host: identity_host.into(), return_to, authenticator }
    }

    /// Never fails the request: every rejection is logged and reported as `None`.
    pub async fn verify(&self, assertion: &Assertion) -> Option<VerifiedIdentity> {
        match self.check(assertion).await {
            Ok(identity) => {
                debug!(identity = %identity, "openid assertion verified");
                Some(identity)
            }
            Err(rejection) => {
                warn!(reason = %rejection, "openid assertion rejected");
                None
            }
        }
    }

    async fn check(&self, assertion: &Assertion) -> Result<VerifiedIdentity, Rejection> {
        let (Some(claimed_id), Some(_)) = (assertion.get(CLAIMED_ID_KEY), assertion.get(IDENTITY_KEY)) else {
            return Err(Rejection::MissingParameters);
        };

        let identity = extract_identity(claimed_id, &self.identity_host)
            .ok_or_else(|| Rejection::InvalidClaimedId(claimed_id.to_owned()))?;

        match assertion.get(MODE_KEY) {
            Some(ID_RES_MODE) => {}
            mode => return Err(Rejection::UnexpectedMode(mode.map(str::to_owned))),
        }

        // the provider confirms signatures only, not who the assertion was issued to
        match assertion.get(RETURN_TO_KEY) {
            Some(return_to) if return_to == self.return_to.as_str() => {}
            return_to => return Err(Rejection::ForeignReturnTo(return_to.map(str::to_owned))),
        }

        if !self.authenticator.authenticate(assertion).await? {
            return Err(Rejection::NotConfirmedByProvider);
        }

        Ok(VerifiedIdentity(identity))
    }
}

#[derive(Error, Debug)]
enum Rejection {
    #[error("claimed_id or identity parameter is missing")]
    MissingParameters,

    #[error("claimed_id '{0}' is not a steam identity")]
    InvalidClaimedId(String),

    #[error("mode is {0:?} instead of id_res")]
    UnexpectedMode(Option<String>),

    #[error("return_to is {0:?} instead of this server's callback")]
    ForeignReturnTo(Option<String>),

    #[error("provider did not confirm the assertion")]
    NotConfirmedByProvider,

    #[error("could not confirm the assertion with the provider: {0}")]
    ProviderUnavailable(#[from] AuthenticatorError),
}

/// Extracts the numeric id from `http(s)://<identity_host>/openid/id/<id>`.
fn extract_identity(claimed_id: &str, identity_host: &str) -> Option<String> {
    let url = Url::parse(claimed_id).ok()?;

    if !matches!(url.scheme(), "http" | "https")
        || !url.host_str()?.eq_ignore_ascii_case(identity_host)
        || url.port().is_some()
        || !url.username().is_empty()
        || url.password().is_some()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return None;
    }

    let mut segments = url.path_segments()?;
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some("openid"), Some("id"), Some(id), None) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            Some(id.to_owned())
        }
        _ => None,
    }
}
