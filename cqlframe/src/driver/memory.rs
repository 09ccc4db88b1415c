// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory scripted driver
//!
//! Statements are matched verbatim (after trimming) against scripted results.
//! Every connection attempt is recorded so callers can assert on how many
//! sessions were created and with which node filter.

use super::{ColumnSpec, Connector, CqlSession, ResultCursor, Row, SessionOptions};
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Rows returned by a scripted statement
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    fail_after: Option<(usize, String)>,
    close_error: Option<String>,
    row_delay: Option<Duration>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Stop the stream with `message` after `rows` rows were delivered
    pub fn fail_after(mut self, rows: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((rows, message.into()));
        self
    }

    /// Wait `delay` before delivering each row
    pub fn row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = Some(delay);
        self
    }

    /// Report `message` when the cursor is closed
    pub fn close_error(mut self, message: impl Into<String>) -> Self {
        self.close_error = Some(message.into());
        self
    }
}

/// Outcome of a scripted statement
#[derive(Debug, Clone)]
pub enum Scripted {
    Rows(ResultSet),
    Fail(String),
    /// Panic inside `query`, to exercise panic isolation. Test builds only.
    #[cfg(any(test, feature = "testing"))]
    Panic(String),
}

#[derive(Default)]
struct State {
    scripts: HashMap<String, Scripted>,
    unreachable: HashSet<String>,
    connect_delay: Option<Duration>,
    connect_log: Vec<SessionOptions>,
}

/// Connector producing [`MemorySession`]s. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<State>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, statement: impl Into<String>, outcome: Scripted) {
        self.state
            .lock()
            .scripts
            .insert(statement.into().trim().to_string(), outcome);
    }

    pub fn script_rows(&self, statement: impl Into<String>, rows: ResultSet) {
        self.script(statement, Scripted::Rows(rows));
    }

    /// Make connection attempts pinned to `node` fail. An empty node refers
    /// to cluster-wide sessions.
    pub fn make_unreachable(&self, node: impl Into<String>) {
        self.state.lock().unreachable.insert(node.into());
    }

    pub fn make_reachable(&self, node: &str) {
        self.state.lock().unreachable.remove(node);
    }

    /// Delay every connection attempt, to widen race windows in tests
    pub fn set_connect_delay(&self, delay: Duration) {
        self.state.lock().connect_delay = Some(delay);
    }

    /// Number of connection attempts so far, failed ones included
    pub fn connect_count(&self) -> usize {
        self.state.lock().connect_log.len()
    }

    pub fn connect_log(&self) -> Vec<SessionOptions> {
        self.state.lock().connect_log.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Session = MemorySession;

    async fn connect(&self, options: &SessionOptions) -> Result<MemorySession> {
        let (id, delay) = {
            let mut state = self.state.lock();
            state.connect_log.push(options.clone());
            (state.connect_log.len(), state.connect_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let node = options.node_filter.pinned_node().unwrap_or("");
        if self.state.lock().unreachable.contains(node) {
            return Err(Error::Connection(format!(
                "no connections were made when creating the session ({})",
                options.node_filter
            )));
        }

        Ok(MemorySession {
            id,
            options: options.clone(),
            state: self.state.clone(),
        })
    }
}

/// Session handed out by [`MemoryConnector`]
pub struct MemorySession {
    id: usize,
    options: SessionOptions,
    state: Arc<Mutex<State>>,
}

impl MemorySession {
    /// Sequence number of the connection attempt that created this session
    pub fn id(&self) -> usize {
        self.id
    }

    /// Options this session was created with
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

#[async_trait]
impl CqlSession for MemorySession {
    async fn query(&self, statement: &str) -> Result<Box<dyn ResultCursor>> {
        let scripted = self.state.lock().scripts.get(statement.trim()).cloned();
        match scripted {
            Some(Scripted::Rows(set)) => Ok(Box::new(MemoryCursor::new(set))),
            Some(Scripted::Fail(message)) => Err(Error::Query(message)),
            #[cfg(any(test, feature = "testing"))]
            Some(Scripted::Panic(message)) => panic!("{}", message),
            None => Err(Error::Query(format!("unconfigured statement: {}", statement))),
        }
    }
}

struct MemoryCursor {
    columns: Vec<ColumnSpec>,
    rows: VecDeque<Row>,
    remaining_before_failure: Option<usize>,
    failure: Option<String>,
    fetch_error: Option<String>,
    close_error: Option<String>,
    row_delay: Option<Duration>,
}

impl MemoryCursor {
    fn new(set: ResultSet) -> Self {
        let (remaining_before_failure, failure) = match set.fail_after {
            Some((rows, message)) => (Some(rows), Some(message)),
            None => (None, None),
        };
        Self {
            columns: set.columns,
            rows: set.rows.into(),
            remaining_before_failure,
            failure,
            fetch_error: None,
            close_error: set.close_error,
            row_delay: set.row_delay,
        }
    }
}

#[async_trait]
impl ResultCursor for MemoryCursor {
    fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    async fn next_row(&mut self) -> Option<Row> {
        if let Some(delay) = self.row_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(remaining) = self.remaining_before_failure.as_mut() {
            if *remaining == 0 {
                self.fetch_error = self.failure.take();
                return None;
            }
            *remaining -= 1;
        }
        self.rows.pop_front()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let cursor = *self;
        match cursor.fetch_error.or(cursor.close_error) {
            Some(message) => Err(Error::Query(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{ClusterConfig, DriverValue};

    #[tokio::test]
    async fn test_connect_records_attempts() {
        let connector = MemoryConnector::new();
        let cluster = ClusterConfig::new("db");

        let session = connector.connect(&cluster.session_options("n1")).await.unwrap();
        assert_eq!(session.id(), 1);
        assert_eq!(session.options().node_filter.pinned_node(), Some("n1"));
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_node_fails_connect() {
        let connector = MemoryConnector::new();
        connector.make_unreachable("n2");

        let options = ClusterConfig::new("db").session_options("n2");
        let err = connector.connect(&options).await.err().unwrap();
        assert!(matches!(err, Error::Connection(_)));
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_reported_on_close() {
        let connector = MemoryConnector::new();
        connector.script_rows(
            "SELECT v FROM t",
            ResultSet::new(vec![ColumnSpec::new("v", "int")])
                .row(vec![Some(DriverValue::Int(1))])
                .row(vec![Some(DriverValue::Int(2))])
                .fail_after(1, "read timeout"),
        );
        let session = connector
            .connect(&ClusterConfig::new("db").session_options(""))
            .await
            .unwrap();

        let mut cursor = session.query("SELECT v FROM t").await.unwrap();
        assert!(cursor.next_row().await.is_some());
        assert!(cursor.next_row().await.is_none());
        let err = cursor.close().await.unwrap_err();
        assert_eq!(err.to_string(), "Query error: read timeout");
    }
}
