use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use flatmate_gateway::app::{self, AppState};

#[derive(Parser)]
#[command(name = "flatmate-gateway", about = "Flatmate bot API gateway")]
struct Cli {
    /// Path to the TOML config file (FLATMATE_* env vars override it).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flatmate_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| std::env::var("FLATMATE_CONFIG").ok());
    let config = flatmate_core::FlatmateConfig::load(config_path.as_deref())
        .context("failed to load configuration")?;
    if config.auth.secret.is_empty() {
        anyhow::bail!("auth.secret must be set (flatmate.toml or FLATMATE_AUTH__SECRET)");
    }

    let db_path = &config.database.path;
    ensure_parent_dir(db_path)
        .with_context(|| format!("failed to create database directory for {db_path}"))?;
    info!(path = %db_path, "opening SQLite database");

    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // schema init is ordered: rota tables carry FKs into the registry tables
    flatmate_rooms::db::init_db(&conn)?;
    flatmate_rota::db::init_db(&conn)?;
    info!("database schema ready");

    let db = Arc::new(Mutex::new(conn));
    let limits = &config.limits;
    let state = Arc::new(AppState {
        secret: config.auth.secret.clone(),
        directory: flatmate_rooms::RoomDirectory::new(Arc::clone(&db)),
        invitations: flatmate_rooms::InvitationManager::new(
            Arc::clone(&db),
            limits.max_invitations,
            limits.invitation_lifespan_days,
        ),
        rules: flatmate_rooms::RuleBook::new(Arc::clone(&db)),
        orders: flatmate_rota::OrderBook::new(Arc::clone(&db), limits.max_orders),
        tasks: flatmate_rota::TaskManager::new(Arc::clone(&db), limits.max_tasks),
        manual: flatmate_rota::ManualTaskManager::new(Arc::clone(&db), limits.max_tasks),
    });
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    info!("Flatmate gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) -> std::io::Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
