use serde::Deserialize;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Deserialize, Debug, Default)]
pub(crate) struct LoggerConfig {
    #[serde(default)]
    pub format: LoggerFormat,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LoggerFormat {
    #[default]
    Json,
    Pretty,
}

pub(super) fn init_logger(config: &LoggerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = SubscriberBuilder::default().with_env_filter(filter);

    match config.format {
        LoggerFormat::Json => builder.json().init(),
        LoggerFormat::Pretty => builder.pretty().init(),
    }
}
