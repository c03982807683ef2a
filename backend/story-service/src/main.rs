use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use story_service::db::PgStoryStore;
use story_service::handlers::{self, ListingErrorPolicy};
use story_service::middleware::{JwtValidator, MetricsMiddleware};
use story_service::services::StoryAccessController;
use story_service::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// `story-service healthcheck` probes the local HTTP health endpoint and
/// exits non-zero when it is not healthy.
async fn run_healthcheck(port: u16) -> io::Result<()> {
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Story Service
///
/// Serves ownership-checked story CRUD and search.
///
/// # Routes
///
/// - `/stories/*` - Create, list, show, edit, update, delete, search stories
/// - `/dashboard` - The caller's own stories
/// - `/api/v1/health*` - Probes
/// - `/metrics` - Prometheus
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(cmd) = std::env::args().nth(1) {
        if cmd == "healthcheck" || cmd == "healthcheck-http" {
            return run_healthcheck(config.app.port).await;
        }
    }

    init_tracing(config.app.json_logs);

    tracing::info!("Starting story-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to run migrations: {e}"),
            )
        })?;

    let controller = web::Data::new(StoryAccessController::new(Arc::new(PgStoryStore::new(
        db_pool,
    ))));
    let policy = web::Data::new(ListingErrorPolicy {
        list_errors_as_not_found: config.stories.list_errors_as_not_found,
    });
    if !config.stories.list_errors_as_not_found {
        tracing::info!("Listing and search store failures render as 500");
    }

    let validator = Arc::new(JwtValidator::hs256(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_issuer.as_deref(),
    ));

    let bind_address = config.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(controller.clone())
            .app_data(policy.clone())
            .wrap(MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure(validator.clone()))
    })
    .bind(&bind_address)?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            tracing::info!("HTTP server stopped");
            return result.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        }
        result = shutdown_signal() => {
            result?;
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    server_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))??;

    tracing::info!("Story-service shut down");
    Ok(())
}
