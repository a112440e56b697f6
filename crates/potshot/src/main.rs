use potshot::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PotshotError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::load()?;
    tracing::info!(
        bind = %config.bind_addr,
        starting_currency = config.game.starting_currency,
        starting_pot = config.game.starting_pot,
        raise_amount = config.game.raise_amount,
        "configuration loaded"
    );

    PotshotServerBuilder::from_config(config)
        .build()
        .await?
        .run()
        .await
}
