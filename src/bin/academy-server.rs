// ABOUTME: Server binary for the academy enrollment API
// ABOUTME: Loads configuration from the environment, applies CLI overrides and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

//! # Academy Server Binary
//!
//! Starts the REST API for course sessions and enrollments.

use academy_server::{config::ServerConfig, logging, server};
use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "academy-server")]
#[command(about = "Academy enrollment API - course sessions, intake and seat capacity")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (e.g. `sqlite:./data/academy.db` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config = config.with_http_port(http_port);
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config = config.with_database_url(database_url)?;
    }

    logging::init_from_config(&config)?;

    info!("Starting Academy Server");
    info!("{}", config.summary());

    if let Err(e) = server::run(config).await {
        error!(error = %e, "Server terminated with an error");
        return Err(e);
    }

    Ok(())
}
