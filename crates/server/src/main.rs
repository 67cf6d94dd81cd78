use clap::Parser;
use micro_typed_server::{Server, ServerConfig, app, shutdown_signal};
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo server answering `GET /` with the time and `POST /add` with a sum.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    config: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let server = Server::builder().config(cli.config).handler(app::routes()).build()?;
    server.serve(shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}
