use std::path::Path;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use issuetrack::config;
use issuetrack::db;
use issuetrack::routes;
use issuetrack::search::IssueSearchIndex;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting issuetrack server on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Open the search index
    let search_index = IssueSearchIndex::open(
        Path::new(&config.search.index_dir),
        config.search.writer_heap_bytes,
    )
    .map_err(|e| {
        log::error!("Search index error: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    let search_index = web::Data::new(search_index);

    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        // Permissive CORS so browser clients can reach the API from any
        // origin; there is no cookie-based state to protect here.
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .expose_headers(vec![
                actix_web::http::header::HeaderName::from_static("x-total-count"),
                actix_web::http::header::HeaderName::from_static("x-issuetrack-alert"),
                actix_web::http::header::HeaderName::from_static("x-issuetrack-params"),
                actix_web::http::header::HeaderName::from_static("x-issuetrack-error"),
            ])
            .max_age(3600);

        App::new()
            // Share database pool and search index with all handlers
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(search_index.clone())
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(cors)
            // Health check routes
            .service(
                web::scope("/health")
                    .route("", web::get().to(routes::health::liveness))
                    .route("/ready", web::get().to(routes::health::readiness)),
            )
            // API routes
            // More specific scopes first: users > issues
            .configure(routes::users::configure)
            .configure(routes::issues::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
