// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Database driver boundary
//!
//! This module defines everything the rest of the crate needs from a CQL
//! driver:
//! - [`DriverValue`]: the closed set of scalar kinds a driver hands back
//! - [`ResultCursor`]: a forward-only row stream with column metadata
//! - [`CqlSession`]: an established session that can run statements
//! - [`Connector`]: creates sessions from [`SessionOptions`]
//!
//! Implementations:
//! - [`scylla`] - the ScyllaDB/Cassandra driver (feature `scylla`, on by default)
//! - [`memory`] - a scripted in-memory driver for tests and offline runs

pub mod memory;
pub mod options;
#[cfg(feature = "scylla")]
pub mod scylla;
pub mod value;

pub use options::{ClusterConfig, Credentials, NodeFilter, SessionOptions, DEFAULT_CQL_PORT};
pub use value::{Decimal, DriverValue};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Column metadata reported by a result cursor before the first row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// CQL type name as the database reports it (`int`, `text`, `blob`, ...)
    pub declared_type: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// One row as delivered by a cursor, positionally aligned with its columns.
/// `None` is a database NULL.
pub type Row = Vec<Option<DriverValue>>;

/// Forward-only, single-pass row stream of one executed statement
#[async_trait]
pub trait ResultCursor: Send {
    /// Column metadata, available before the first row
    fn columns(&self) -> &[ColumnSpec];

    /// Next row, or `None` once the stream is exhausted.
    ///
    /// A fetch failure also ends the stream; the failure is reported by
    /// [`ResultCursor::close`].
    async fn next_row(&mut self) -> Option<Row>;

    /// Release the cursor and report any error seen while fetching
    async fn close(self: Box<Self>) -> Result<()>;
}

/// An established, reusable session. Safe for concurrent use.
#[async_trait]
pub trait CqlSession: Send + Sync + 'static {
    /// Execute a statement and open a cursor over its rows
    async fn query(&self, statement: &str) -> Result<Box<dyn ResultCursor>>;
}

/// Creates sessions against a cluster
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Session: CqlSession;

    async fn connect(&self, options: &SessionOptions) -> Result<Self::Session>;
}
