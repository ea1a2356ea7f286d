// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use serde::Serialize;

use crate::error::LogsApiError;
use crate::storage::LogStore;

/// `type` value that enumerates every source type under the storage root.
pub const ALL_SOURCE_TYPES: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogQuery {
    pub source_type: String,
    pub date: String,
}

impl CatalogQuery {
    /// Builds the query from `/logs/list` parameters. `type` defaults to `all`, `date` to
    /// the store's current date.
    pub fn from_params(params: &HashMap<String, String>, store: &LogStore) -> Self {
        let source_type = params
            .get("type")
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| ALL_SOURCE_TYPES.to_string());
        let date = params
            .get("date")
            .filter(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| store.today());
        Self { source_type, date }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub source_type: String,
    pub date: String,
    pub file: String,
    /// `/logs/content` request that fetches this entry
    pub path: String,
}

impl LogEntry {
    fn new(source_type: &str, date: &str, file: String) -> Self {
        let path = format!(
            "/logs/content?type={}&date={}&file={}",
            urlencoding::encode(source_type),
            urlencoding::encode(date),
            urlencoding::encode(&file)
        );
        Self {
            source_type: source_type.to_string(),
            date: date.to_string(),
            file,
            path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogListing {
    pub logs: Vec<LogEntry>,
}

pub fn list_logs(store: &LogStore, query: &CatalogQuery) -> Result<LogListing, LogsApiError> {
    let source_types = if query.source_type == ALL_SOURCE_TYPES {
        store.source_types()?
    } else {
        vec![query.source_type.clone()]
    };

    let mut logs = Vec::new();
    for source_type in &source_types {
        for file in store.list_files(source_type, &query.date)? {
            logs.push(LogEntry::new(source_type, &query.date, file));
        }
    }

    Ok(LogListing { logs })
}
