// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP intake for log shippers.
//!
//! Accepts single records or batches of JSON log records behind a static bearer token, stores
//! each record as its own file under `<root>/<source_type>/<date>/<hour>_<digest>.json`, and
//! serves listings and contents of what was stored.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod http_utils;
pub mod log_catalog;
pub mod log_reader;
pub mod log_receiver;
pub mod logs_api;
pub mod storage;
