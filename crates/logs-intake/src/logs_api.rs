// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use http_body_util::BodyExt;
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper::{http, Method, Request, StatusCode};
use serde_json::json;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::verify_bearer_token;
use crate::config::Config;
use crate::error::LogsApiError;
use crate::http_utils::{
    create_json_response, create_preflight_response, log_and_create_error_response,
    parse_query_string, verify_request_content_length, with_cors_headers, HttpResponse,
};
use crate::log_catalog::{self, CatalogQuery};
use crate::log_reader;
use crate::log_receiver::LogReceiver;
use crate::storage::{run_blocking, LogStore};

const HEALTH_ENDPOINT_PATH: &str = "/health";
const LOGS_ENDPOINT_PATH: &str = "/logs";
const LIST_ENDPOINT_PATH: &str = "/logs/list";
const CONTENT_ENDPOINT_PATH: &str = "/logs/content";

type ServeError = Box<dyn std::error::Error + Send + Sync>;

pub struct LogsApi {
    pub config: Arc<Config>,
    pub store: Arc<LogStore>,
    pub log_receiver: Arc<dyn LogReceiver + Send + Sync>,
}

impl LogsApi {
    pub async fn start_logs_api(&self, shutdown: CancellationToken) -> Result<(), ServeError> {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Logs API listening on {addr}");

        self.serve(listener, shutdown).await
    }

    /// Accepts connections on `listener` until `shutdown` is cancelled. Every connection is
    /// served on its own task.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServeError> {
        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let (conn, remote_addr) = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Logs API shutting down");
                    break;
                },
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok(accepted) => accepted,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // a panicking handler only loses its own connection
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };

            let config = self.config.clone();
            let store = self.store.clone();
            let log_receiver = self.log_receiver.clone();
            let service = service_fn(move |req: Request<Incoming>| {
                LogsApi::endpoint_handler(
                    config.clone(),
                    store.clone(),
                    log_receiver.clone(),
                    remote_addr,
                    req,
                )
            });

            let conn = hyper_util::rt::TokioIo::new(conn);
            let server = server.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }

        joinset.shutdown().await;
        Ok(())
    }

    pub async fn endpoint_handler<B>(
        config: Arc<Config>,
        store: Arc<LogStore>,
        log_receiver: Arc<dyn LogReceiver + Send + Sync>,
        remote_addr: SocketAddr,
        req: Request<B>,
    ) -> http::Result<HttpResponse>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        if req.method() == Method::OPTIONS {
            return create_preflight_response().map(with_cors_headers);
        }

        let path = req.uri().path().to_string();
        let is_protected = matches!(
            path.as_str(),
            LOGS_ENDPOINT_PATH | LIST_ENDPOINT_PATH | CONTENT_ENDPOINT_PATH
        );
        if is_protected {
            if let Err(err) = verify_bearer_token(req.headers(), &config.api_key) {
                warn!("Unauthorized access attempt from IP: {}", remote_addr.ip());
                return log_and_create_error_response("Rejected request", &err)
                    .map(with_cors_headers);
            }
        }

        let response = match (req.method(), path.as_str()) {
            (&Method::GET, HEALTH_ENDPOINT_PATH) => Self::health_handler(&store),
            (&Method::POST, LOGS_ENDPOINT_PATH) => {
                match Self::receive_logs_handler(&config, log_receiver, req).await {
                    Ok(count) => create_json_response(
                        &json!({ "status": "success", "count": count }),
                        StatusCode::OK,
                    ),
                    Err(err) => log_and_create_error_response("Error processing logs", &err),
                }
            }
            (&Method::GET, LIST_ENDPOINT_PATH) => {
                let params = parse_query_string(req.uri().query());
                let query = CatalogQuery::from_params(&params, &store);
                let catalog_store = store.clone();
                let listing =
                    run_blocking(move || log_catalog::list_logs(&catalog_store, &query)).await;
                match listing {
                    Ok(listing) => match serde_json::to_value(listing) {
                        Ok(body) => create_json_response(&body, StatusCode::OK),
                        Err(err) => {
                            log_and_create_error_response("Error listing logs", &err.into())
                        }
                    },
                    Err(err) => log_and_create_error_response("Error listing logs", &err),
                }
            }
            (&Method::GET, CONTENT_ENDPOINT_PATH) => {
                let params = parse_query_string(req.uri().query());
                let reader_store = store.clone();
                let content =
                    run_blocking(move || log_reader::read_log(&reader_store, &params)).await;
                match content {
                    Ok(content) => create_json_response(&content, StatusCode::OK),
                    Err(err) => log_and_create_error_response("Error getting log content", &err),
                }
            }
            (_, HEALTH_ENDPOINT_PATH) | (_, LOGS_ENDPOINT_PATH) | (_, LIST_ENDPOINT_PATH)
            | (_, CONTENT_ENDPOINT_PATH) => create_json_response(
                &json!({ "error": "Method not allowed" }),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            _ => create_json_response(&json!({ "error": "Not found" }), StatusCode::NOT_FOUND),
        };

        response.map(with_cors_headers)
    }

    async fn receive_logs_handler<B>(
        config: &Config,
        log_receiver: Arc<dyn LogReceiver + Send + Sync>,
        req: Request<B>,
    ) -> Result<usize, LogsApiError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();
        verify_request_content_length(&parts.headers, config.max_request_content_length)?;

        let body = body
            .collect()
            .await
            .map_err(|e| LogsApiError::BadRequest(format!("Error reading request body: {e}")))?
            .to_bytes();

        // double check the size in case transfer encoding is used
        if body.len() > config.max_request_content_length {
            return Err(LogsApiError::PayloadTooLarge);
        }

        log_receiver.receive_logs(&body).await
    }

    fn health_handler(store: &LogStore) -> http::Result<HttpResponse> {
        let now = store.now();
        // fractional seconds are omitted when zero
        let format = if now.timestamp_subsec_micros() == 0 {
            "%Y-%m-%dT%H:%M:%S"
        } else {
            "%Y-%m-%dT%H:%M:%S%.6f"
        };
        let timestamp = now.format(format).to_string();
        create_json_response(
            &json!({ "status": "ok", "timestamp": timestamp }),
            StatusCode::OK,
        )
    }
}
