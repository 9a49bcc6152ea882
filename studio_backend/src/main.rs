use anyhow::Result;
use clap::{Parser, Subcommand};
use studio_backend::bootstrap;
use studio_backend::config::StudioConfig;
use studio_backend::realtime::RealtimeBridge;
use studio_backend::telemetry;
use studio_backend::{api, utils};

#[derive(Parser)]
#[command(author, version, about = "Gallery Studio backend daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = StudioConfig::from_env()?;
    let bootstrap = bootstrap::initialize(&config)?;
    tracing::info!(app = utils::APP_NAME, api_port = config.api_port, "bootstrap complete");

    let realtime = RealtimeBridge::new(config.realtime.channel_capacity);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, bootstrap.database, realtime).await,
    }
}
