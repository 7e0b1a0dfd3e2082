use crate::{
    clock::SystemClock, configuration::Configuration,
    configuration_handler::ConfigurationHandler, http::create_app,
};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod clock;
mod configuration;
mod configuration_handler;
mod http;
mod reservation;
mod schedule;
mod summary;
#[cfg(test)]
mod testutils;
mod types;
mod validation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("######################");
    println!("# Table Reservations #");
    println!("######################");

    let configuration = ConfigurationHandler::parse_arguments().inspect_err(|err| {
        error!(?err, "Invalid service hours. Check opening time, closing time and slot interval.");
    })?;

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessible at:\n{address}");
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(
        restaurant = %configuration.restaurant().name,
        hours = %configuration.schedule().hours_label(),
        "Reservation page ready"
    );
    let app = create_app(configuration, Arc::new(SystemClock));
    axum::serve(listener, app).await?;
    Ok(())
}
