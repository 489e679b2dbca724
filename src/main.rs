use std::net::TcpListener;
use std::time::Duration;

use actix_web::web;
use sqlx::postgres::PgPoolOptions;

use spendbook::auth::RefreshRegistry;
use spendbook::configuration::get_configuration;
use spendbook::events::EventBus;
use spendbook::startup::run;
use spendbook::telemetry::init_telemetry;

/// How often expired-but-unredeemed refresh entries are evicted.
const REGISTRY_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created");

    let registry = web::Data::new(RefreshRegistry::new());
    let events = web::Data::new(EventBus::default());

    // Unredeemed refresh entries would otherwise sit in memory forever.
    let sweeper = registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REGISTRY_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = sweeper.sweep_expired();
            if evicted > 0 {
                tracing::info!(evicted = evicted, "Swept expired refresh entries");
            }
        }
    });

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        pool,
        configuration.auth.clone(),
        registry,
        events,
    )?;

    server.await
}
