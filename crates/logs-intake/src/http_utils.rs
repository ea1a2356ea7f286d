// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{
    header::{self, HeaderValue},
    http::{self, HeaderMap},
    Response, StatusCode,
};
use serde_json::json;
use tracing::{debug, error};

use crate::error::LogsApiError;

pub type HttpResponse = Response<Full<Bytes>>;

/// Serializes `body` as the JSON body of a response with the given status code.
pub fn create_json_response(
    body: &serde_json::Value,
    status: StatusCode,
) -> http::Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
}

/// Does two things:
/// 1. Logs the error. Server errors are written at error level with their full detail, client
///    errors at debug level.
/// 2. Returns the error message in the body of a JSON response with the error's status code.
///
/// Response body format:
/// {
///     "error": message
/// }
pub fn log_and_create_error_response(
    context: &str,
    err: &LogsApiError,
) -> http::Result<HttpResponse> {
    let status = err.status_code();
    if status.is_server_error() {
        error!("{context}: {err:?}");
    } else {
        debug!("{context}: {err}");
    }
    create_json_response(&json!({ "error": err.to_string() }), status)
}

/// Adds the permissive CORS headers every response carries.
pub fn with_cors_headers(mut response: HttpResponse) -> HttpResponse {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// Answers a CORS preflight request.
pub fn create_preflight_response() -> http::Result<HttpResponse> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
        .header(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Authorization, Content-Type",
        )
        .body(Full::new(Bytes::new()))
}

/// Takes a request's header map, and verifies that the "content-length" and/or
/// "Transfer-Encoding" header is present, valid, and less than the given max_content_length.
pub fn verify_request_content_length(
    header_map: &HeaderMap,
    max_content_length: usize,
) -> Result<(), LogsApiError> {
    let content_length_header = match header_map.get(header::CONTENT_LENGTH) {
        Some(res) => res,
        None => {
            if let Some(transfer_encoding_header) = header_map.get(header::TRANSFER_ENCODING) {
                debug!(
                    "Transfer-Encoding header is present: {:?}",
                    transfer_encoding_header
                );
                return Ok(());
            }
            return Err(LogsApiError::LengthRequired);
        }
    };
    let content_length = content_length_header
        .to_str()
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .ok_or_else(|| LogsApiError::BadRequest("Invalid Content-Length header".to_string()))?;
    if content_length > max_content_length {
        return Err(LogsApiError::PayloadTooLarge);
    }
    Ok(())
}

/// Parses a percent-encoded query string into key-value pairs. Later duplicates win.
pub fn parse_query_string(query: Option<&str>) -> HashMap<String, String> {
    query
        .unwrap_or("")
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((decode_component(key), decode_component(value)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(raw)
}
