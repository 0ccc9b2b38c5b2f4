use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use super::{Assertion, MODE_KEY};

pub const CHECK_AUTHENTICATION_MODE: &str = "check_authentication";

/// Confirms with the provider that an assertion was really issued by it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssertionAuthenticator {
    async fn authenticate(&self, assertion: &Assertion) -> Result<bool>;
}

/// Direct verification (OpenID 2.0 section 11.4.2): the assertion is posted back to the
/// provider with `openid.mode=check_authentication` and the provider answers in
/// key-value form.
pub struct CheckAuthentication {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl CheckAuthentication {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http_client, endpoint })
    }
}

#[async_trait]
impl AssertionAuthenticator for CheckAuthentication {
    async fn authenticate(&self, assertion: &Assertion) -> Result<bool> {
        let form: Vec<(&str, &str)> = assertion
            .openid_parameters()
            .map(|(key, value)| if key == MODE_KEY { (key, CHECK_AUTHENTICATION_MODE) } else { (key, value) })
            .collect();

        let response = self.http_client.post(self.endpoint.clone()).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        let is_valid = is_valid_response(&body);
        if !is_valid {
            debug!(response = %body, "provider answered check_authentication negatively");
        }

        Ok(is_valid)
    }
}

/// The last `is_valid` line of a key-value form response decides.
fn is_valid_response(body: &str) -> bool {
    body.lines().filter_map(|line| line.trim().strip_prefix("is_valid:")).last() == Some("true")
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("check_authentication request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider answered check_authentication with {0}")]
    UnexpectedStatus(StatusCode),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use std::{net::SocketAddr, time::Duration};

    use axum::{http::StatusCode, response::IntoResponse, routing::post, Form, Router};
    use url::Url;

    use super::{is_valid_response, AssertionAuthenticator, CheckAuthentication, Error};
    use crate::domain::openid::Assertion;

    const CLAIMED_ID: &str = "https://steamcommunity.com/openid/id/76561198012345678";

    async fn spawn_provider(router: Router) -> Url {
        let listener =
            tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("binding test listener should be successful");
        let address: SocketAddr = listener.local_addr().expect("listener should have a local address");
        tokio::spawn(async move { axum::serve(listener, router).await });

        Url::parse(&format!("http://{address}/openid/login")).expect("this is a valid url")
    }

    async fn handle_check_authentication(Form(form): Form<Vec<(String, String)>>) -> impl IntoResponse {
        let mode = form.iter().find(|(key, _)| key == "openid.mode").map(|(_, value)| value.as_str());
        let forwards_signature = form.iter().any(|(key, _)| key == "openid.sig");
        let leaks_other_parameters = form.iter().any(|(key, _)| !key.starts_with("openid."));

        let is_valid = mode == Some("check_authentication") && forwards_signature && !leaks_other_parameters;
        format!("ns:http://specs.openid.net/auth/2.0\nis_valid:{is_valid}\n")
    }

    fn signed_assertion() -> Assertion {
        Assertion::from_query_pairs(
            [
                ("openid.ns", "http://specs.openid.net/auth/2.0"),
                ("openid.mode", "id_res"),
                ("openid.claimed_id", CLAIMED_ID),
                ("openid.identity", CLAIMED_ID),
                ("openid.sig", "c2lnbmF0dXJl"),
                ("openid.signed", "signed,op_endpoint,claimed_id,identity"),
                ("unrelated", "value"),
            ]
            .map(|(k, v)| (k.to_owned(), v.to_owned())),
        )
    }

    #[tokio::test]
    async fn when_provider_confirms_assertion_authenticator_should_return_true() {
        let endpoint =
            spawn_provider(Router::new().route("/openid/login", post(handle_check_authentication))).await;
        let authenticator =
            CheckAuthentication::new(endpoint, Duration::from_secs(5)).expect("creating client should be successful");

        let result = authenticator.authenticate(&signed_assertion()).await;

        assert!(matches!(result, Ok(true)));
    }

    #[tokio::test]
    async fn when_provider_rejects_assertion_authenticator_should_return_false() {
        let endpoint = spawn_provider(Router::new().route(
            "/openid/login",
            post(|| async { "ns:http://specs.openid.net/auth/2.0\nis_valid:false\n" }),
        ))
        .await;
        let authenticator =
            CheckAuthentication::new(endpoint, Duration::from_secs(5)).expect("creating client should be successful");

        let result = authenticator.authenticate(&signed_assertion()).await;

        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn when_provider_fails_authenticator_should_return_unexpected_status() {
        let endpoint = spawn_provider(
            Router::new().route("/openid/login", post(|| async { StatusCode::SERVICE_UNAVAILABLE })),
        )
        .await;
        let authenticator =
            CheckAuthentication::new(endpoint, Duration::from_secs(5)).expect("creating client should be successful");

        let result = authenticator.authenticate(&signed_assertion()).await;

        assert!(matches!(result, Err(Error::UnexpectedStatus(status)) if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn when_provider_is_too_slow_authenticator_should_return_request_error() {
        let endpoint = spawn_provider(Router::new().route(
            "/openid/login",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "is_valid:true\n"
            }),
        ))
        .await;
        let authenticator = CheckAuthentication::new(endpoint, Duration::from_millis(100))
            .expect("creating client should be successful");

        let result = authenticator.authenticate(&signed_assertion()).await;

        assert!(matches!(result, Err(Error::Request(_))));
    }

    #[test]
    fn is_valid_response_requires_a_positive_is_valid_line() {
        assert!(is_valid_response("ns:http://specs.openid.net/auth/2.0\nis_valid:true\n"));
        assert!(is_valid_response("ns:http://specs.openid.net/auth/2.0\r\nis_valid:true\r\n"));
        assert!(!is_valid_response("ns:http://specs.openid.net/auth/2.0\nis_valid:false\n"));
        assert!(!is_valid_response("is_valid:true\nis_valid:false\n"));
        assert!(!is_valid_response("<html>is_valid:true</html>"));
        assert!(!is_valid_response(""));
    }
}
