use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::{DatabaseSettings, JwtSettings};
use crate::error::{json_error_handler, path_error_handler};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{authors, books, health_check, login, logout, publishers, refresh, register};

/// Build a lazily connecting pool from database settings
pub fn get_connection_pool(configuration: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(configuration.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&configuration.connection_string())
}

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let pool = connection.clone();
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))

            // Protected routes (valid, non-revoked access token)
            .service(
                web::resource("/auth/logout")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), pool.clone()))
                    .route(web::post().to(logout)),
            )
            .service(
                web::scope("/authors")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), pool.clone()))
                    .configure(authors::configure),
            )
            .service(
                web::scope("/publishers")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), pool.clone()))
                    .configure(publishers::configure),
            )
            .service(
                web::scope("/books")
                    .wrap(JwtMiddleware::new(jwt_config.clone(), pool.clone()))
                    .configure(books::configure),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
