use std::net::SocketAddr;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use school_admin::bootstrap::initialize_admin_user;
use school_admin::database::get_database_connection;
use school_admin::redis_service::JwtBlacklist;
use school_admin::state::AppState;
use school_admin::storage::FileStorage;
use school_admin::{app, config::APP_CONFIG, utils::tracing::init_standard_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    init_standard_tracing(env!("CARGO_CRATE_NAME"));

    tracing::info!("Starting application...");

    let config = APP_CONFIG.clone();

    let db_connection = get_database_connection(&config.database_url).await?;

    if config.run_migrations {
        tracing::info!("Applying pending migrations...");
        Migrator::up(&db_connection, None)
            .await
            .context("Failed to apply migrations")?;
    }

    tracing::info!("Initializing Redis connection...");
    let blacklist = match JwtBlacklist::connect(&config.redis_url).await {
        Ok(blacklist) => {
            tracing::info!("Redis connection initialized successfully");
            blacklist
        }
        Err(e) => {
            tracing::error!("Failed to initialize Redis connection: {:#}", e);
            tracing::warn!("Continuing with an in-process token blacklist...");
            JwtBlacklist::in_memory()
        }
    };

    let storage = FileStorage::new(
        &config.storage_root,
        config.storage_buckets.clone(),
        config.storage_public_buckets.clone(),
        config.storage_public_base_url.clone(),
    );
    storage
        .init()
        .await
        .with_context(|| format!("Failed to create storage root {}", config.storage_root))?;
    tracing::info!(root = %storage.root().display(), "Storage ready");

    tracing::info!("Checking admin user...");
    if let Err(e) = initialize_admin_user(&db_connection, &config).await {
        tracing::error!("Failed to initialize admin user: {:#}", e);
        tracing::warn!("Continuing without admin user initialization...");
    }

    let http_address = format!("0.0.0.0:{}", config.port);
    let app = app::create_app(AppState::new(db_connection, blacklist, storage, config));

    tracing::info!("HTTP server listening on {}", &http_address);

    let listener = tokio::net::TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("Failed to bind {http_address}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server error")?;

    Ok(())
}
