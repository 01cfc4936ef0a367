use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod dashboard;
mod data;
mod db;
mod engine;
mod error;
mod scheduler;

use config::Config;
use dashboard::AppState;
use data::{MatchDataSource, Snapshot};
use db::Database;
use engine::{Settler, Simulator};
use scheduler::{Job, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        "Starting valuebet-engine (min_edge={:.3}, stake_fraction={:.3}, quotes={:?})",
        config.min_edge, config.stake_fraction, config.quote_selection
    );

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    if let Some(path) = &config.import_snapshot {
        Snapshot::from_file(path)?.import(&db)?;
    }

    // Fixtures, stats and quotes are read back from the same store the
    // snapshot importer (or an external collector) writes to.
    let source: Arc<dyn MatchDataSource> = Arc::new(db.clone());
    info!("Match data source: {}", source.name());

    let scheduler = Scheduler::new(
        Simulator::new(
            db.clone(),
            source.clone(),
            config.staking_policy(),
            config.quote_selection,
        ),
        Settler::new(db.clone(), source),
    );
    scheduler.spawn_periodic(Job::Simulation, config.simulation_interval());
    scheduler.spawn_periodic(Job::Settlement, config.settlement_interval());

    let app = dashboard::router(AppState {
        db,
        scheduler,
    });
    let addr: SocketAddr = config.api_addr.parse()?;
    info!("Portfolio API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run API server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
