// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Productivity Tracker API Server
//!
//! Serves goals, tasks and timed activities for authenticated users.

use productivity_tracker::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, RecordStore},
    services::HostPrefixGenerator,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Productivity Tracker API");

    let db = match config.store {
        StoreBackend::Firestore => {
            RecordStore::Firestore(FirestoreDb::new(&config.gcp_project_id).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on exit");
            RecordStore::memory()
        }
    };

    let ids = HostPrefixGenerator::from_config(config.id_host_prefix);
    tracing::info!(
        prefix = ids.prefix(),
        source = ?ids.source(),
        "Identifier generator initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, Arc::new(ids)));

    // Build router
    let app = productivity_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("productivity_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
