//! # Oriana Binary
//!
//! Assembles the service from the adapters compiled in and serves it.
//! The store adapter is chosen at startup from `database.url`.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use configs::{DatabaseSettings, LogSettings, Settings};
use ori_api::{build_router, AppState};
use ori_auth_jwt::JwtIdentityProvider;
use ori_core::models::Identity;
use ori_core::services::{MediaService, UserService};
use ori_core::traits::{MediaRepo, UserRepo};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-memory")]
use ori_db_memory::{MemoryMediaRepo, MemoryUserRepo};

#[cfg(feature = "db-sqlite")]
use ori_db_sqlite::SqliteStore;

#[cfg(not(any(feature = "db-sqlite", feature = "db-memory")))]
compile_error!("enable at least one store adapter: db-sqlite or db-memory");

#[derive(Parser)]
#[command(name = "oriana", version, about = "Personal media log service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Sign a bearer token with the configured secret, for local testing
    IssueToken {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings.log);
    settings.log_sources();

    let identity = Arc::new(JwtIdentityProvider::new(
        &settings.auth.jwt_secret,
        settings.auth.issuer.clone(),
        settings.auth.audience.clone(),
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings, identity).await,
        Command::IssueToken { uid, email, name, ttl_hours } => {
            let token = identity.issue(&Identity { uid, email, name }, token_ttl(ttl_hours)?)?;
            println!("{token}");
            Ok(())
        }
    }
}

fn token_ttl(hours: i64) -> anyhow::Result<chrono::Duration> {
    chrono::Duration::try_hours(hours)
        .filter(|ttl| *ttl > chrono::Duration::zero())
        .with_context(|| format!("--ttl-hours {hours} is out of range"))
}

fn init_tracing(log: &LogSettings) {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(settings: Settings, identity: Arc<JwtIdentityProvider>) -> anyhow::Result<()> {
    let (media_repo, user_repo) = build_stores(&settings.database).await?;

    let state = AppState {
        media: MediaService::new(media_repo),
        users: UserService::new(user_repo),
        identity,
    };
    let app = build_router(state, &settings.server.cors_origins);

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "oriana listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("oriana stopped");
    Ok(())
}

#[allow(unreachable_code)]
async fn build_stores(database: &DatabaseSettings) -> anyhow::Result<(Arc<dyn MediaRepo>, Arc<dyn UserRepo>)> {
    #[cfg(feature = "db-memory")]
    {
        if database.is_memory() {
            warn!("using the in-memory store, data is lost on shutdown");
            return Ok((Arc::new(MemoryMediaRepo::new()), Arc::new(MemoryUserRepo::new())));
        }
    }

    #[cfg(feature = "db-sqlite")]
    {
        let store = SqliteStore::new(&database.url).await?;
        return Ok((Arc::new(store.clone()), Arc::new(store)));
    }

    anyhow::bail!("no store adapter compiled in for database url {}", database.url)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
