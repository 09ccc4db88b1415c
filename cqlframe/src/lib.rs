// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! cqlframe - serve CQL query results as typed data frames
//!
//! This crate bridges a dashboarding host and a ScyllaDB/Cassandra cluster.
//! Each query of a batch carries a JSON payload with a CQL statement and an
//! optional target node; the statement runs on a session pinned to that node
//! and its rows come back as a typed, column-oriented [`Frame`].
//!
//! # Quick Start
//!
//! ```no_run
//! use cqlframe::{DataQuery, DataSourceInstance, DataSourceSettings, QueryDataRequest};
//! use std::collections::HashMap;
//!
//! # async fn run() -> cqlframe::Result<()> {
//! let settings = DataSourceSettings::from_json(br#"{"host":"10.0.0.1"}"#, &HashMap::new())?;
//! let instance = DataSourceInstance::scylla(settings);
//!
//! let request = QueryDataRequest {
//!     queries: vec![DataQuery::new("A", r#"{"queryText":"SELECT * FROM ks.t"}"#)],
//! };
//! let response = instance.query_data(request).await;
//! for (ref_id, result) in &response.responses {
//!     println!("{}: {} frames", ref_id, result.frames.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  DataSourceInstance (settings, health)   │
//! └──────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌──────────────────────────────────────────┐
//! │  QueryExecutor (payload, batch tasks)    │
//! └──────────────────────────────────────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │  SessionCache    │   │  Frame builder   │
//! │  (per target)    │   │  + coercion      │
//! └──────────────────┘   └──────────────────┘
//!          │                       ▲
//!          ▼                       │
//! ┌──────────────────────────────────────────┐
//! │  driver (scylla, memory)                 │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - [`datasource`] - Instance settings, query entry point, health, disposal
//! - [`exec`] - Payload model and query execution
//! - [`session`] - One session per target node
//! - [`frame`] - Typed frames and the row-to-frame builder
//! - [`types`] - Declared-type mapping and value coercion
//! - [`driver`] - Database driver boundary and implementations
//! - [`error`] - Error types

pub mod datasource;
pub mod driver;
pub mod error;
pub mod exec;
pub mod frame;
pub mod session;
pub mod types;

pub use datasource::{DataSourceInstance, DataSourceSettings, HealthCheckResult, HealthStatus};
pub use driver::{ClusterConfig, ColumnSpec, Connector, CqlSession, DriverValue, ResultCursor};
pub use error::{Error, Result};
pub use exec::{DataQuery, DataResponse, QueryDataRequest, QueryDataResponse, QueryExecutor};
pub use frame::{Field, Frame};
pub use session::SessionCache;
pub use types::{FieldKind, FieldVector, WireValue};

#[cfg(feature = "scylla")]
pub use driver::scylla::ScyllaConnector;
