use std::net::TcpListener;
use std::time::Duration;

use library_catalog::cleanup::spawn_revocation_sweeper;
use library_catalog::configuration::get_configuration;
use library_catalog::startup::{get_connection_pool, run};
use library_catalog::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let pool = get_connection_pool(&configuration.database).map_err(|e| {
        tracing::error!("Failed to create connection pool: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    tracing::info!("Database ready");

    let sweeper = spawn_revocation_sweeper(
        pool.clone(),
        Duration::from_secs(configuration.revocation.sweep_interval_seconds.max(1)),
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, pool, configuration.jwt.clone())?;
    let result = server.await;

    sweeper.abort();
    result
}
