// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::error::LogsApiError;
use crate::storage::{LogStore, StoredLogKey};

const MISSING_PARAMETERS: &str = "Missing required parameters: type, date, file";

/// Extracts the `(type, date, file)` key from `/logs/content` parameters. All three are
/// required and must be non-empty.
pub fn key_from_params(params: &HashMap<String, String>) -> Result<StoredLogKey, LogsApiError> {
    let required = |name: &str| {
        params
            .get(name)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| LogsApiError::BadRequest(MISSING_PARAMETERS.to_string()))
    };

    Ok(StoredLogKey {
        source_type: required("type")?,
        date: required("date")?,
        file: required("file")?,
    })
}

pub fn read_log(
    store: &LogStore,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, LogsApiError> {
    let key = key_from_params(params)?;
    store.read_record(&key)
}
