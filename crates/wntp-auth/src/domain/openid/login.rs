use url::Url;

use super::{CLAIMED_ID_KEY, IDENTITY_KEY, MODE_KEY, OPENID_NS, RETURN_TO_KEY};

pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
pub const CHECKID_SETUP_MODE: &str = "checkid_setup";
/// Route the provider should send the user back to after signing in.
pub const CALLBACK_ROUTE: &str = "/auth/callback";

/// `checkid_setup` request that starts a sign-in on the provider's site.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    endpoint: Url,
    realm: Url,
    return_to: Url,
}

impl LoginRequest {
    /// `realm` is the public base URL of this server.
    pub fn new(endpoint: Url, realm: Url) -> Result<Self, url::ParseError> {
        let return_to = realm.join(CALLBACK_ROUTE)?;

        Ok(Self { endpoint, realm, return_to })
    }

    pub fn return_to(&self) -> &Url {
        &self.return_to
    }

    pub fn redirect_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID_NS)
            .append_pair(MODE_KEY, CHECKID_SETUP_MODE)
            .append_pair(IDENTITY_KEY, IDENTIFIER_SELECT)
            .append_pair(CLAIMED_ID_KEY, IDENTIFIER_SELECT)
            .append_pair("openid.realm", self.realm.as_str())
            .append_pair(RETURN_TO_KEY, self.return_to.as_str());
        url
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use url::Url;

    use super::LoginRequest;

    #[test]
    fn redirect_url_should_carry_a_checkid_setup_request() {
        let request = LoginRequest::new(
            Url::parse("https://steamcommunity.com/openid/login").expect("this is a valid url"),
            Url::parse("https://auth.wntp.app").expect("this is a valid url"),
        )
        .expect("creating login request should be successful");

        let url = request.redirect_url();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("steamcommunity.com"));
        assert_eq!(url.path(), "/openid/login");
        assert_eq!(query["openid.ns"], "http://specs.openid.net/auth/2.0");
        assert_eq!(query["openid.mode"], "checkid_setup");
        assert_eq!(query["openid.identity"], "http://specs.openid.net/auth/2.0/identifier_select");
        assert_eq!(query["openid.claimed_id"], "http://specs.openid.net/auth/2.0/identifier_select");
        assert_eq!(query["openid.realm"], "https://auth.wntp.app/");
        assert_eq!(query["openid.return_to"], "https://auth.wntp.app/auth/callback");
        assert_eq!(request.return_to().as_str(), "https://auth.wntp.app/auth/callback");
    }
}
