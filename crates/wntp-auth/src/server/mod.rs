use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use crate::{application::Application, config::ApplicationConfig};

mod response;
mod router;

pub(super) struct ServerConfig {
    pub port: u16,
}

impl From<&ApplicationConfig> for ServerConfig {
    fn from(value: &ApplicationConfig) -> Self {
        Self { port: value.port }
    }
}

pub(super) async fn run(application: Application, config: ServerConfig) -> anyhow::Result<()> {
    let app = app(Arc::new(application));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("starting auth server on {}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

fn app(application: Arc<Application>) -> Router {
    Router::new().route("/health", get(|| async { "" })).nest("/auth", router::auth::router(application))
}
