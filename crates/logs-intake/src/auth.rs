// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use hyper::header;
use hyper::http::HeaderMap;

use crate::error::LogsApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Checks the `Authorization: Bearer <token>` header against the configured key.
///
/// The token must match exactly: no trimming, no case folding.
pub fn verify_bearer_token(headers: &HeaderMap, api_key: &str) -> Result<(), LogsApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or(LogsApiError::Unauthorized)?;

    if token == api_key {
        Ok(())
    } else {
        Err(LogsApiError::Unauthorized)
    }
}
