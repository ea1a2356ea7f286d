// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use logs_intake::clock::FixedClock;
use logs_intake::config::Config;
use logs_intake::log_receiver::FsLogReceiver;
use logs_intake::logs_api::LogsApi;
use logs_intake::storage::LogStore;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub const TEST_API_KEY: &str = "_not_a_real_key_";

/// A logs API served on an ephemeral localhost port, storing into a temporary directory.
pub struct RunningApi {
    pub addr: SocketAddr,
    pub storage: TempDir,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl RunningApi {
    /// Starts the API with a clock frozen at 2024-01-15 09:30 local time.
    pub async fn start() -> Self {
        let storage = TempDir::new().expect("Failed to create storage dir");
        let instant = Local
            .with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
            .single()
            .expect("Unambiguous local time");
        let store = Arc::new(LogStore::with_clock(storage.path(), FixedClock(instant)));
        let config = Arc::new(Config {
            storage_root: storage.path().to_path_buf(),
            api_key: TEST_API_KEY.to_string(),
            log_file: None,
            ..Default::default()
        });

        let logs_api = LogsApi {
            config,
            store: store.clone(),
            log_receiver: Arc::new(FsLogReceiver::new(store)),
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let shutdown = CancellationToken::new();
        let serve_shutdown = shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = logs_api.serve(listener, serve_shutdown).await {
                panic!("Logs API stopped with an error: {e}");
            }
        });

        RunningApi {
            addr,
            storage,
            shutdown,
            handle,
        }
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("Logs API did not shut down in time")
            .expect("Logs API task failed");
    }
}

/// Send an HTTP request over TCP and return the status code and JSON body
pub async fn send_tcp_request(
    addr: SocketAddr,
    uri: &str,
    method: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Result<(StatusCode, serde_json::Value), Box<dyn std::error::Error>> {
    let stream = timeout(Duration::from_secs(2), tokio::net::TcpStream::connect(addr)).await??;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    tokio::spawn(async move {
        let _ = conn.await;
    });

    let mut request_builder = Request::builder()
        .uri(uri)
        .method(method)
        .header("Host", addr.to_string())
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        request_builder = request_builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body_data) => request_builder
            .header("Content-Length", body_data.len().to_string())
            .body(Full::new(Bytes::from(body_data.to_string())))?,
        None => request_builder.body(Full::new(Bytes::new()))?,
    };

    let response = timeout(Duration::from_secs(2), sender.send_request(request)).await??;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}
