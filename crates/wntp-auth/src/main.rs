use std::path::PathBuf;

use clap::Parser;

mod application;
mod config;
mod domain;
mod logger;
mod server;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Sets a port to start an auth server
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,
    /// Sets the public base url that Steam redirects back to
    #[arg(long)]
    pub base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let app_config = config::load_config(&args)?;

    logger::init_logger(&app_config.log);

    let application = application::Application::new(&app_config)?;

    server::run(application, (&app_config).into()).await?;
    Ok(())
}
