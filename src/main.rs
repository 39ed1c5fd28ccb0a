use anyhow::Result;
use clap::Parser;

pub mod handlers;
pub mod llm;
pub mod pdf;
pub mod server;

#[tokio::main]
async fn main() -> Result<()> {
    use server::{server_app::Server, server_config::ServerConfig};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    Server::new(config).run().await?;

    Ok(())
}
