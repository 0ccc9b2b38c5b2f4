use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::application::CallbackOutcome;

pub const VERIFICATION_FAILED: &str = "verification_failed";
pub const SERVER_ERROR: &str = "server_error";

/// Browser page that hands the outcome of a callback back to the app through its URL scheme.
pub(crate) struct CallbackPage<'a> {
    app_scheme: &'a str,
    outcome: CallbackOutcome,
}

impl<'a> CallbackPage<'a> {
    pub fn new(app_scheme: &'a str, outcome: CallbackOutcome) -> Self {
        Self { app_scheme, outcome }
    }

    pub fn redirect_target(&self) -> String {
        match &self.outcome {
            CallbackOutcome::Success { identity, token } => format!(
                "{}://auth/success?token={}&identity={}",
                self.app_scheme,
                urlencoding::encode(token.as_str()),
                urlencoding::encode(identity.as_str())
            ),
            CallbackOutcome::VerificationFailed => error_target(self.app_scheme, VERIFICATION_FAILED),
            CallbackOutcome::ServerError => error_target(self.app_scheme, SERVER_ERROR),
        }
    }
}

impl IntoResponse for CallbackPage<'_> {
    fn into_response(self) -> axum::response::Response {
        let target = self.redirect_target();

        match self.outcome {
            CallbackOutcome::Success { identity, .. } => {
                (StatusCode::OK, Html(success_page(&target, identity.as_str()))).into_response()
            }
            CallbackOutcome::VerificationFailed => (
                StatusCode::UNAUTHORIZED,
                Html(error_page(
                    "Authentication Failed",
                    "Could not verify your Steam identity. Please try again.",
                    &target,
                )),
            )
                .into_response(),
            CallbackOutcome::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page("Error", "An error occurred during authentication. Please try again.", &target)),
            )
                .into_response(),
        }
    }
}

fn error_target(app_scheme: &str, message: &str) -> String {
    format!("{app_scheme}://auth/error?message={message}")
}

fn success_page(target: &str, identity: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Authentication Successful</title>
    <meta http-equiv="refresh" content="0;url={href}">
</head>
<body>
    <h1>Authentication Successful!</h1>
    <p>Redirecting back to WNTP...</p>
    <p>Steam ID: {identity}</p>
    <p id="fallback" hidden><a href="{href}">Click here if you are not redirected automatically</a></p>
    <script>
        window.location.href = {script_target};
        setTimeout(function () {{ document.getElementById("fallback").hidden = false; }}, 2000);
    </script>
</body>
</html>
"#,
        href = html_escape(target),
        identity = html_escape(identity),
        script_target = script_string(target),
    )
}

fn error_page(title: &str, message: &str, target: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
</head>
<body>
    <h1>{title}</h1>
    <p>{message}</p>
    <p><a href="{href}">Return to WNTP</a></p>
    <script>
        setTimeout(function () {{ window.location.href = {script_target}; }}, 2000);
    </script>
</body>
</html>
"#,
        title = html_escape(title),
        message = html_escape(message),
        href = html_escape(target),
        script_target = script_string(target),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// JavaScript string literal that cannot close the surrounding script element.
fn script_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace('<', "\\u003c")
}

#[cfg(test)]
mod test {
    use super::{html_escape, script_string};

    #[test]
    fn html_escape_should_neutralize_markup() {
        assert_eq!(html_escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn script_string_should_not_close_the_script_element() {
        let literal = script_string("</script><script>alert(1)</script>");

        assert!(!literal.contains("</script>"));
        assert!(literal.starts_with('"') && literal.ends_with('"'));
    }
}
