use std::{sync::Arc, time::Duration};

use crate::{
    configuration::Configuration, configuration_handler::ConfigurationHandler,
    database_interface::DatabaseInterface, http::create_app, identity::LineIdentityVerifier,
    local_store::LocalStore,
};
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod delivery_areas;
mod error;
mod http;
mod identity;
mod local_store;
mod schema;
mod slot_template;
#[cfg(test)]
mod testutils;
mod types;
mod validation;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("delivery_booking=info,tower_http=info")),
        )
        .init();

    println!("####################");
    println!("# Delivery Booking #");
    println!("####################");

    let configuration = ConfigurationHandler::parse_arguments();
    let identity = Arc::new(LineIdentityVerifier::from_configuration(&configuration));
    info!(auth_mode = ?configuration.auth_mode(), "Identity verification configured");

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "Listening");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url, configuration.database_pool_size()) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. Unset DATABASE_URL to keep bookings in memory.");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, identity)
    } else {
        warn!("No DATABASE_URL configured, bookings are kept in memory");
        create_app(LocalStore::default(), identity)
    };

    axum::serve(listener, app).await
}
