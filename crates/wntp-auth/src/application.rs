use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use tracing::error;
use wntp_token::jwt::Jwt;

use crate::{
    config::ApplicationConfig,
    domain::{
        openid::{
            authentication::CheckAuthentication, login::LoginRequest, Assertion, AssertionVerifier, VerifiedIdentity,
        },
        session::{JwtSessionIssuer, JwtSessionIssuerConfig, SessionIssuer},
    },
};

pub struct Application {
    pub app_scheme: String,
    pub login_request: LoginRequest,
    pub verifier: Arc<AssertionVerifier>,
    pub session_issuer: Arc<dyn SessionIssuer + Send + Sync>,
}

/// Terminal result of a callback. Every callback resolves to exactly one of these.
#[derive(Debug)]
pub enum CallbackOutcome {
    Success { identity: VerifiedIdentity, token: Jwt },
    VerificationFailed,
    ServerError,
}

impl Application {
    pub fn new(config: &ApplicationConfig) -> anyhow::Result<Self> {
        let authenticator = CheckAuthentication::new(
            config.provider.endpoint.clone(),
            Duration::from_secs(config.provider.timeout),
        )
        .context("failed to create the provider http client")?;

        let session_issuer = JwtSessionIssuer::new(
            JwtSessionIssuerConfig::builder()
                .secret(&config.token.secret)
                .lifetime(Duration::from_secs(config.token.lifetime))
                .issuer(&config.token.issuer)
                .build(),
        )
        .context("token signing configuration is invalid")?;

        let login_request = LoginRequest::new(config.provider.endpoint.clone(), config.base_url.clone())
            .context("failed to derive the callback url from base_url")?;

        let verifier = AssertionVerifier::new(
            &config.provider.identity_host,
            login_request.return_to().clone(),
            Arc::new(authenticator),
        );

        Ok(Self {
            app_scheme: config.app_scheme.clone(),
            login_request,
            verifier: Arc::new(verifier),
            session_issuer: Arc::new(session_issuer),
        })
    }

    pub async fn authenticate(&self, assertion: &Assertion) -> CallbackOutcome {
        let Some(identity) = self.verifier.verify(assertion).await else {
            return CallbackOutcome::VerificationFailed;
        };

        match self.session_issuer.issue(&identity) {
            Ok(token) => CallbackOutcome::Success { identity, token },
            Err(e) => {
                error!(error = %e, identity = %identity, "failed to issue a session token");
                CallbackOutcome::ServerError
            }
        }
    }
}
