// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution
//!
//! - [`QueryModel`] decodes one query payload
//! - [`QueryExecutor`] runs one query end to end and, for a batch, runs each
//!   query independently so one failure never touches its siblings

pub mod executor;
pub mod model;

pub use executor::QueryExecutor;
pub use model::QueryModel;

use crate::error::Error;
use crate::frame::Frame;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One query of a batch: a caller-assigned reference id and a JSON payload
#[derive(Debug, Clone)]
pub struct DataQuery {
    pub ref_id: String,
    pub json: Vec<u8>,
}

impl DataQuery {
    pub fn new(ref_id: impl Into<String>, json: impl Into<Vec<u8>>) -> Self {
        Self {
            ref_id: ref_id.into(),
            json: json.into(),
        }
    }
}

/// Result of one query: an error, or its frames
#[derive(Debug, Default, Serialize)]
pub struct DataResponse {
    pub frames: Vec<Frame>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<Error>,
}

impl DataResponse {
    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            error: None,
        }
    }

    pub fn with_error(error: Error) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn serialize_error<S: Serializer>(error: &Option<Error>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// A batch of queries
#[derive(Debug, Clone, Default)]
pub struct QueryDataRequest {
    pub queries: Vec<DataQuery>,
}

/// Responses of a batch, keyed by reference id
#[derive(Debug, Default, Serialize)]
pub struct QueryDataResponse {
    pub responses: BTreeMap<String, DataResponse>,
}
