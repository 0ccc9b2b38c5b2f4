use std::{any::Any, sync::Arc};

use axum::{
    debug_handler,
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{error, warn};

use crate::{
    application::{Application, CallbackOutcome},
    domain::openid::Assertion,
    server::response::error_payload,
};

use self::page::CallbackPage;

mod page;

pub(crate) fn router(application: Arc<Application>) -> axum::Router {
    Router::new()
        .route("/login", get(handle_login))
        .route("/callback", get(handle_callback).fallback(handle_method_not_allowed))
        .layer(CatchPanicLayer::custom(render_panic(application.app_scheme.clone())))
        .with_state(application)
}

/// Turns a panic inside a handler into the generic server error page.
fn render_panic(app_scheme: String) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic| {
        let message = panic
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        error!(panic = message, "auth handler panicked");

        CallbackPage::new(&app_scheme, CallbackOutcome::ServerError).into_response()
    }
}

async fn handle_login(State(application): State<Arc<Application>>) -> impl IntoResponse {
    Redirect::to(application.login_request.redirect_url().as_str())
}

#[debug_handler]
async fn handle_callback(
    State(application): State<Arc<Application>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let outcome = match query {
        Ok(Query(pairs)) => application.authenticate(&Assertion::from_query_pairs(pairs)).await,
        Err(rejection) => {
            warn!(error = %rejection, "could not parse openid callback query");
            CallbackOutcome::VerificationFailed
        }
    };

    CallbackPage::new(&application.app_scheme, outcome).into_response()
}

async fn handle_method_not_allowed(method: Method) -> impl IntoResponse {
    warn!(%method, "rejected openid callback with unsupported method");
    (StatusCode::METHOD_NOT_ALLOWED, error_payload("METHOD_NOT_ALLOWED", "method not allowed."))
}
