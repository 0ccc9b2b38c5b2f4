use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use anyhow::{anyhow, ensure};
use config::{Config, Environment, File, FileFormat, Source};
use directories::BaseDirs;
use serde::Deserialize;
use url::Url;

use crate::{logger::LoggerConfig, Args};

pub(crate) const DEFAULT_APP_SCHEME: &str = "com.wntp";
pub(crate) const DEFAULT_PROVIDER_ENDPOINT: &str = "https://steamcommunity.com/openid/login";
pub(crate) const DEFAULT_IDENTITY_HOST: &str = "steamcommunity.com";
pub(crate) const DEFAULT_TOKEN_ISSUER: &str = "wntp-auth";

#[derive(Deserialize, Debug)]
pub(crate) struct ApplicationConfig {
    pub port: u16,
    pub base_url: Url,
    pub app_scheme: String,
    pub provider: ProviderConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub log: LoggerConfig,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ProviderConfig {
    /// OpenID 2.0 endpoint used both for login redirects and `check_authentication`.
    pub endpoint: Url,
    pub identity_host: String,
    /// Seconds
    pub timeout: u64,
}

#[derive(Deserialize)]
pub(crate) struct TokenConfig {
    pub secret: String,
    /// Seconds
    pub lifetime: u64,
    pub issuer: String,
}

impl Debug for TokenConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .field("issuer", &self.issuer)
            .finish()
    }
}

pub(super) fn load_config(args: &Args) -> anyhow::Result<ApplicationConfig> {
    let config_file_path = if let Some(ref path_override) = args.config {
        path_override.clone()
    } else {
        default_config_file_path()?
    };

    build_config(File::from(config_file_path).format(FileFormat::Toml), args)
}

fn default_config_file_path() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("failed to get base directories"))?;
    let wntp_config_dir = base_dirs.config_dir().join("wntp");
    if !wntp_config_dir.exists() {
        std::fs::create_dir_all(&wntp_config_dir)?;
    }

    let config_file_path = wntp_config_dir.join("auth_config.toml");
    if !config_file_path.exists() {
        std::fs::write(&config_file_path, include_str!("../static/default_config.toml"))?;
    }

    Ok(config_file_path)
}

fn build_config<S>(file: S, args: &Args) -> anyhow::Result<ApplicationConfig>
where
    S: Source + Send + Sync + 'static,
{
    let config: ApplicationConfig = Config::builder()
        .set_default("port", 8080)?
        .set_default("app_scheme", DEFAULT_APP_SCHEME)?
        .set_default("provider.endpoint", DEFAULT_PROVIDER_ENDPOINT)?
        .set_default("provider.identity_host", DEFAULT_IDENTITY_HOST)?
        .set_default("provider.timeout", 10)?
        .set_default("token.lifetime", 7 * 24 * 3600)?
        .set_default("token.issuer", DEFAULT_TOKEN_ISSUER)?
        .add_source(file)
        .add_source(Environment::with_prefix("WNTP").separator("__"))
        .set_override_option("port", args.port.map(|port| port.to_string()))?
        .set_override_option("base_url", args.base_url.clone())?
        .build()?
        .try_deserialize()?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &ApplicationConfig) -> anyhow::Result<()> {
    ensure!(!config.token.secret.is_empty(), "token.secret must be configured");
    ensure!(config.token.lifetime > 0, "token.lifetime must be greater than zero");
    ensure!(config.provider.timeout > 0, "provider.timeout must be greater than zero");
    ensure!(!config.app_scheme.is_empty(), "app_scheme must not be empty");

    Ok(())
}
