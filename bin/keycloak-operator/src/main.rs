use anyhow::Result;
use kube::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod keycloak_controller;
mod status;

use config::{LogFormat, OperatorConfig};
use keycloak_controller::KeycloakController;

#[tokio::main]
async fn main() -> Result<()> {
    let config = OperatorConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting keycloak-operator...");

    let client = Client::try_default().await?;
    KeycloakController::new(client, config).run().await?;

    info!("Shutdown signal received, exiting...");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
