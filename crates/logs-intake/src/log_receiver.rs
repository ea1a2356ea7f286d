// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::LogsApiError;
use crate::storage::{run_blocking, LogStore};

#[async_trait]
pub trait LogReceiver {
    /// Deserializes a batch of log records from a request body, persists them, and returns the
    /// number of records accepted.
    async fn receive_logs(&self, body: &[u8]) -> Result<usize, LogsApiError>;
}

/// Stores every record of a batch as its own file in a [`LogStore`].
///
/// Records are written one after the other. The first failure aborts the batch and the records
/// written before it stay on disk.
#[derive(Clone)]
pub struct FsLogReceiver {
    pub store: Arc<LogStore>,
}

impl FsLogReceiver {
    pub fn new(store: Arc<LogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LogReceiver for FsLogReceiver {
    async fn receive_logs(&self, body: &[u8]) -> Result<usize, LogsApiError> {
        let records = match serde_json::from_slice::<serde_json::Value>(body)? {
            serde_json::Value::Array(records) => records,
            record => vec![record],
        };
        debug!("Received {} log records to store", records.len());

        let store = self.store.clone();
        run_blocking(move || {
            for (index, record) in records.iter().enumerate() {
                if !record.is_object() {
                    return Err(LogsApiError::Server(format!(
                        "Log record at index {index} is not a JSON object"
                    )));
                }
                store.write_record(record)?;
            }
            Ok(records.len())
        })
        .await
    }
}
