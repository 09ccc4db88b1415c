// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data source instances
//!
//! A [`DataSourceInstance`] is created from [`DataSourceSettings`] when the
//! host configures a data source, serves query batches and health probes for
//! as long as that configuration lives, and is disposed before the host
//! replaces it.

pub mod settings;

pub use settings::DataSourceSettings;

use crate::driver::Connector;
use crate::exec::{QueryDataRequest, QueryDataResponse, QueryExecutor};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub message: String,
}

/// One configured data source
pub struct DataSourceInstance<C: Connector> {
    settings: DataSourceSettings,
    executor: Arc<QueryExecutor<C>>,
}

impl<C: Connector> DataSourceInstance<C> {
    pub fn new(settings: DataSourceSettings, connector: C) -> Self {
        let executor = QueryExecutor::new(connector, settings.cluster_config());
        Self {
            settings,
            executor: Arc::new(executor),
        }
    }

    pub fn settings(&self) -> &DataSourceSettings {
        &self.settings
    }

    pub fn executor(&self) -> &Arc<QueryExecutor<C>> {
        &self.executor
    }

    /// Run every query of the batch; each reference id gets its own response
    pub async fn query_data(&self, request: QueryDataRequest) -> QueryDataResponse {
        log::info!(
            "QueryData: {} queries for host {}",
            request.queries.len(),
            self.settings.host
        );
        self.executor.execute_batch(request).await
    }

    /// Stateless probe; does not contact the cluster
    pub fn check_health(&self) -> HealthCheckResult {
        HealthCheckResult {
            status: HealthStatus::Ok,
            message: "Data source is working".to_string(),
        }
    }

    /// Close every cached session and return how many were closed. The
    /// instance stays usable; later queries reconnect.
    pub fn dispose(&self) -> usize {
        let closed = self.executor.sessions().close_all();
        log::info!("Disposed data source for host {} ({} sessions)", self.settings.host, closed);
        closed
    }
}

#[cfg(feature = "scylla")]
impl DataSourceInstance<crate::driver::scylla::ScyllaConnector> {
    /// Instance backed by the ScyllaDB driver
    pub fn scylla(settings: DataSourceSettings) -> Self {
        Self::new(settings, crate::driver::scylla::ScyllaConnector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::MemoryConnector;
    use crate::exec::DataQuery;
    use std::collections::HashMap;

    fn instance() -> DataSourceInstance<MemoryConnector> {
        let settings = DataSourceSettings::from_json(br#"{"host":"db"}"#, &HashMap::new()).unwrap();
        DataSourceInstance::new(settings, MemoryConnector::new())
    }

    #[test]
    fn test_health_is_ok() {
        let health = instance().check_health();
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.message, "Data source is working");
        assert_eq!(
            serde_json::to_value(&health).unwrap(),
            serde_json::json!({"status": "ok", "message": "Data source is working"})
        );
    }

    #[tokio::test]
    async fn test_dispose_closes_sessions() {
        let instance = instance();
        let request = QueryDataRequest {
            queries: vec![
                DataQuery::new("A", r#"{"queryText":"SELECT 1","queryHost":"n1"}"#),
                DataQuery::new("B", r#"{"queryText":"SELECT 1"}"#),
            ],
        };
        instance.query_data(request).await;

        assert_eq!(instance.dispose(), 2);
        assert!(instance.executor().sessions().is_empty());
        assert_eq!(instance.dispose(), 0);
    }
}
