// ABOUTME: HTTP server assembly: shared resources, router with middleware, and lifecycle
// ABOUTME: Binds the listener and shuts down gracefully on Ctrl-C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # HTTP Server
//!
//! [`build_router`] is what integration tests drive with `oneshot`; [`run`]
//! adds the listener and signal handling on top.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppError;
use crate::ledger::EnrollmentLedger;
use crate::middleware::{make_request_span, record_response, setup_cors, REQUEST_ID_HEADER};
use crate::routes::{AdminRoutes, EnrollmentRoutes, HealthRoutes, SessionRoutes};

/// Everything a request handler may need, shared behind an `Arc`
pub struct ServerResources {
    /// Storage for reads and session scheduling
    pub database: Arc<Database>,
    /// Single write path for seat-affecting changes
    pub ledger: EnrollmentLedger,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire the ledger to `database`
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let database = Arc::new(database);
        let ledger = EnrollmentLedger::new(Arc::clone(&database), config.ledger);
        Self {
            database,
            ledger,
            config: Arc::new(config),
        }
    }
}

/// Build the application router with all routes and middleware
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let http = &resources.config.http;

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_response),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(RequestBodyLimitLayer::new(http.max_request_body_bytes))
        .layer(setup_cors(http))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            http.request_timeout(),
        ));

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(EnrollmentRoutes::routes(Arc::clone(&resources)))
        .merge(AdminRoutes::routes(Arc::clone(&resources)))
        .merge(SessionRoutes::routes(Arc::clone(&resources)))
        .fallback(handle_not_found)
        .layer(middleware)
}

async fn handle_not_found() -> AppError {
    AppError::not_found("Route")
}

/// Open the database, bind the listener and serve until a shutdown signal
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails while running
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let database = Database::new(&config.database)
        .await
        .context("Failed to open database")?;

    let address = format!("{}:{}", config.http.host, config.http.port);
    let resources = Arc::new(ServerResources::new(database, config));
    let router = build_router(Arc::clone(&resources));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(address = %listener.local_addr()?, "Academy server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    resources.database.close().await;
    info!("Academy server stopped");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

async fn shutdown_signal() {
    match wait_for_signal().await {
        Ok(name) => info!(signal = name, "Shutdown signal received, draining connections"),
        Err(e) => warn!(error = %e, "Signal handling unavailable, shutting down"),
    }
}

async fn wait_for_signal() -> Result<&'static str, ShutdownSignalError> {
    let ctrl_c = async {
        signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC)?;
        Ok::<_, ShutdownSignalError>("ctrl_c")
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?
            .recv()
            .await;
        Ok::<_, ShutdownSignalError>("sigterm")
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<&'static str, ShutdownSignalError>>();

    tokio::select! {
        result = ctrl_c => result,
        result = terminate => result,
    }
}
