// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for cqlframe

use std::time::Duration;
use thiserror::Error;

/// Result type alias for cqlframe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cqlframe operations
///
/// Only query-level faults are represented here. Faults while converting
/// individual values never surface as errors; see [`crate::types::coerce_value`].
#[derive(Error, Debug)]
pub enum Error {
    /// Query payload could not be decoded
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Session could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement could not be executed
    #[error("Query error: {0}")]
    Query(String),

    /// Session creation or query execution exceeded its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid data source settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Frame construction errors
    #[error("Frame error: {0}")]
    Frame(String),

    /// Query task failed unexpectedly
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-friendly category name, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Payload(_) => "payload",
            Error::Connection(_) => "connection",
            Error::Query(_) => "query",
            Error::Timeout(_) => "timeout",
            Error::Config(_) => "config",
            Error::Frame(_) => "frame",
            Error::Internal(_) => "internal",
        }
    }
}
