// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::fs::OpenOptions;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use logs_intake::config::Config;
use logs_intake::log_receiver::FsLogReceiver;
use logs_intake::logs_api::LogsApi;
use logs_intake::storage::LogStore;

#[tokio::main]
pub async fn main() {
    let config = match Config::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Error creating config on server logs API startup: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_level, config.log_file.as_deref()) {
        eprintln!("Error initializing logging: {e}");
        process::exit(1);
    }
    debug!("Logging subsystem enabled");

    if config.uses_default_api_key() {
        warn!("API_KEY is not set, using the default key. Set API_KEY before exposing this service");
    }

    let store = Arc::new(LogStore::new(&config.storage_root));
    if let Err(e) = store.ensure_root() {
        error!(
            "Unable to create log storage directory {}: {e}",
            config.storage_root.display()
        );
        process::exit(1);
    }

    let logs_api = LogsApi {
        config: Arc::clone(&config),
        store: Arc::clone(&store),
        log_receiver: Arc::new(FsLogReceiver::new(store)),
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    if let Err(e) = logs_api.start_logs_api(shutdown).await {
        error!("Error when running server logs API: {e}");
        process::exit(1);
    }
    info!("Server logs API stopped");
}

fn init_logging(
    log_level: &str,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(format!("h2=off,hyper=off,{log_level}"))?;

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_level(true)
                .with_thread_names(false)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_file(false)
                .with_target(true),
        )
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown signal received, stopping server logs API");
    shutdown.cancel();
}
