// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query executor

use super::{DataQuery, DataResponse, QueryDataRequest, QueryDataResponse, QueryModel};
use crate::driver::{ClusterConfig, Connector, CqlSession};
use crate::error::{Error, Result};
use crate::frame::{build_frame, Frame, RESPONSE_FRAME_NAME};
use crate::session::SessionCache;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Runs queries of one data source instance against its session cache.
///
/// Safe to share between tasks; every query acquires its session through the
/// cache and builds its own frame.
pub struct QueryExecutor<C: Connector> {
    sessions: SessionCache<C>,
}

impl<C: Connector> QueryExecutor<C> {
    pub fn new(connector: C, cluster: ClusterConfig) -> Self {
        Self {
            sessions: SessionCache::new(connector, cluster),
        }
    }

    pub fn sessions(&self) -> &SessionCache<C> {
        &self.sessions
    }

    /// Execute one query. Failures are reported in the response, never raised.
    pub async fn execute(&self, query: &DataQuery) -> DataResponse {
        match self.run(query).await {
            Ok(frames) => DataResponse::with_frames(frames),
            Err(e) => {
                log::warn!("Query '{}' failed ({}): {}", query.ref_id, e.kind(), e);
                DataResponse::with_error(e)
            }
        }
    }

    async fn run(&self, query: &DataQuery) -> Result<Vec<Frame>> {
        let model = QueryModel::parse(&query.json)?;

        if model.format.is_empty() {
            log::info!("Query '{}': format is empty, defaulting to table", query.ref_id);
        }

        let Some(statement) = model.query_text() else {
            if model.query_txt.is_some() {
                log::warn!(
                    "Query '{}' sets only the deprecated 'queryTxt' field; nothing is executed",
                    query.ref_id
                );
            }
            return Ok(vec![Frame::new(RESPONSE_FRAME_NAME)]);
        };
        let target = model.query_host();
        log::debug!(
            "Query '{}': executing {:?} on {}",
            query.ref_id,
            statement,
            target.as_deref().unwrap_or("<cluster>")
        );

        let session = self.sessions.acquire(target.as_deref()).await?;

        let materialize = async {
            let cursor = session.query(&statement).await?;
            build_frame(RESPONSE_FRAME_NAME, cursor).await
        };
        let frame = match self.sessions.cluster().request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, materialize)
                .await
                .map_err(|_| Error::Timeout(timeout))??,
            None => materialize.await?,
        };

        Ok(vec![frame])
    }

    /// Execute every query of a batch concurrently.
    ///
    /// Each query runs in its own task and its outcome, including a panic,
    /// lands under its own reference id.
    pub async fn execute_batch(self: &Arc<Self>, request: QueryDataRequest) -> QueryDataResponse {
        log::debug!("Executing batch of {} queries", request.queries.len());

        let mut pending = BTreeSet::new();
        let mut tasks = JoinSet::new();
        for query in request.queries {
            pending.insert(query.ref_id.clone());
            let executor = Arc::clone(self);
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(executor.execute(&query)).catch_unwind().await;
                let response = outcome.unwrap_or_else(|panic| {
                    let message = panic_message(panic.as_ref());
                    log::error!("Query '{}' panicked: {}", query.ref_id, message);
                    DataResponse::with_error(Error::Internal(message))
                });
                (query.ref_id, response)
            });
        }

        let mut response = QueryDataResponse::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((ref_id, result)) => {
                    pending.remove(&ref_id);
                    response.responses.insert(ref_id, result);
                }
                Err(e) => log::error!("Query task failed: {}", e),
            }
        }

        for ref_id in pending {
            response.responses.insert(
                ref_id,
                DataResponse::with_error(Error::Internal("query task did not complete".to_string())),
            );
        }
        response
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{MemoryConnector, ResultSet, Scripted};
    use crate::driver::{ColumnSpec, DriverValue};
    use crate::types::FieldVector;
    use std::time::Duration;

    fn executor() -> QueryExecutor<MemoryConnector> {
        QueryExecutor::new(MemoryConnector::new(), ClusterConfig::new("db"))
    }

    #[tokio::test]
    async fn test_missing_query_text_yields_empty_frame() {
        let executor = executor();
        let response = executor.execute(&DataQuery::new("A", r#"{"format":"table"}"#)).await;
        assert!(response.error.is_none());
        assert_eq!(response.frames.len(), 1);
        assert_eq!(response.frames[0].name, "response");
        assert!(response.frames[0].is_empty());
        assert_eq!(executor.sessions().connector().connect_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_error_only() {
        let response = executor().execute(&DataQuery::new("A", r#"{"queryTxt": 123}"#)).await;
        assert!(matches!(response.error, Some(Error::Payload(_))));
        assert!(response.frames.is_empty());
    }

    #[tokio::test]
    async fn test_session_failure_yields_error_only() {
        let executor = executor();
        executor.sessions().connector().make_unreachable("10.1.1.1");
        let response = executor
            .execute(&DataQuery::new(
                "A",
                r#"{"queryText":"SELECT * FROM t","queryHost":"10.1.1.1"}"#,
            ))
            .await;
        assert!(matches!(response.error, Some(Error::Connection(_))));
        assert!(response.frames.is_empty());
    }

    #[tokio::test]
    async fn test_query_uses_pinned_session() {
        let executor = executor();
        executor.sessions().connector().script_rows(
            "SELECT v FROM t",
            ResultSet::new(vec![ColumnSpec::new("v", "int")]).row(vec![Some(DriverValue::Int(3))]),
        );

        let response = executor
            .execute(&DataQuery::new(
                "A",
                r#"{"queryText":"SELECT v FROM t","queryHost":"10.0.0.4"}"#,
            ))
            .await;

        assert!(response.error.is_none());
        assert_eq!(response.frames[0].fields[0].values, FieldVector::Int64(vec![Some(3)]));
        assert!(executor.sessions().contains(Some("10.0.0.4")));
    }

    #[tokio::test]
    async fn test_request_timeout_bounds_row_fetch() {
        let connector = MemoryConnector::new();
        connector.script_rows(
            "SELECT v FROM slow",
            ResultSet::new(vec![ColumnSpec::new("v", "int")])
                .row(vec![Some(DriverValue::Int(1))])
                .row_delay(Duration::from_millis(500)),
        );
        let cluster = ClusterConfig::new("db").with_request_timeout(Duration::from_millis(20));
        let executor = QueryExecutor::new(connector, cluster);

        let response = executor
            .execute(&DataQuery::new("A", r#"{"queryText":"SELECT v FROM slow"}"#))
            .await;
        assert!(matches!(response.error, Some(Error::Timeout(_))));
        assert!(response.frames.is_empty());
        // the session survives a timed out query
        assert_eq!(executor.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_query_error_yields_error_only() {
        let executor = executor();
        executor
            .sessions()
            .connector()
            .script("SELECT * FROM missing", Scripted::Fail("unconfigured table missing".into()));
        let response = executor
            .execute(&DataQuery::new("A", r#"{"queryText":"SELECT * FROM missing"}"#))
            .await;
        assert!(matches!(response.error, Some(Error::Query(_))));
        assert!(response.frames.is_empty());
    }

    #[tokio::test]
    async fn test_batch_isolates_panicking_query() {
        let executor = Arc::new(executor());
        let connector = executor.sessions().connector();
        connector.script_rows(
            "SELECT v FROM t",
            ResultSet::new(vec![ColumnSpec::new("v", "int")]).row(vec![Some(DriverValue::Int(1))]),
        );
        connector.script("SELECT v FROM poison", Scripted::Panic("corrupt frame".into()));

        let request = QueryDataRequest {
            queries: vec![
                DataQuery::new("A", r#"{"queryText":"SELECT v FROM t"}"#),
                DataQuery::new("B", r#"{"queryText":"SELECT v FROM poison"}"#),
                DataQuery::new("C", r#"{"queryText":"SELECT v FROM t","queryHost":"n2"}"#),
            ],
        };
        let response = executor.execute_batch(request).await;

        assert_eq!(response.responses.len(), 3);
        match &response.responses["B"].error {
            Some(Error::Internal(message)) => assert_eq!(message, "corrupt frame"),
            other => panic!("expected internal error, got {:?}", other),
        }
        assert!(response.responses["B"].frames.is_empty());
        assert_eq!(response.responses["A"].frames[0].row_count(), 1);
        assert_eq!(response.responses["C"].frames[0].row_count(), 1);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
