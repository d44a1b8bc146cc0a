// notefile - note files backend
// Entry point and server setup

use notefile::{api, app, config::ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notefile=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting notefile server");

    let config = ServerConfig::from_env()?;
    let state = app::setup(&config).await?;

    api::serve(state, config.listen_addr).await?;

    Ok(())
}
