// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use hyper::StatusCode;

/// Failures a request handler can report back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum LogsApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Log file not found")]
    NotFound,

    #[error("Missing Content-Length and Transfer-Encoding header")]
    LengthRequired,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Server(String),
}

impl LogsApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LogsApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            LogsApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            LogsApiError::NotFound => StatusCode::NOT_FOUND,
            LogsApiError::LengthRequired => StatusCode::LENGTH_REQUIRED,
            LogsApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LogsApiError::Io(_) | LogsApiError::Json(_) | LogsApiError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
