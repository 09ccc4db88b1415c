// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data source fixture over the in-memory driver

use cqlframe::driver::memory::{MemoryConnector, ResultSet, Scripted};
use cqlframe::driver::{ColumnSpec, DriverValue};
use cqlframe::{DataQuery, DataResponse, DataSourceInstance, DataSourceSettings, QueryDataRequest, QueryDataResponse};
use std::collections::HashMap;

pub const USERS_QUERY: &str = "SELECT id, name FROM ks.users";
pub const BROKEN_QUERY: &str = "SELECT * FROM ks.missing";
#[cfg(feature = "testing")]
pub const PANIC_QUERY: &str = "SELECT * FROM ks.poison";

/// A data source instance whose connector is scripted in memory
pub struct DataSourceFixture {
    pub connector: MemoryConnector,
    pub instance: DataSourceInstance<MemoryConnector>,
}

impl DataSourceFixture {
    /// Fixture with the standard scripts loaded
    pub fn new() -> Self {
        Self::with_settings(r#"{"host":"10.0.0.1"}"#)
    }

    pub fn with_settings(json: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let connector = MemoryConnector::new();
        connector.script_rows(
            USERS_QUERY,
            ResultSet::new(vec![ColumnSpec::new("id", "int"), ColumnSpec::new("name", "text")])
                .row(vec![Some(DriverValue::Int(1)), Some(DriverValue::Text("a".into()))])
                .row(vec![Some(DriverValue::Int(2)), None]),
        );
        connector.script(BROKEN_QUERY, Scripted::Fail("unconfigured table missing".into()));
        #[cfg(feature = "testing")]
        connector.script(PANIC_QUERY, Scripted::Panic("driver invariant violated".into()));

        let settings =
            DataSourceSettings::from_json(json.as_bytes(), &HashMap::new()).expect("Failed to parse settings");
        let instance = DataSourceInstance::new(settings, connector.clone());
        Self { connector, instance }
    }

    /// Run a batch of `(ref_id, payload)` pairs
    pub async fn run(&self, queries: &[(&str, String)]) -> QueryDataResponse {
        let request = QueryDataRequest {
            queries: queries
                .iter()
                .map(|(ref_id, json)| DataQuery::new(*ref_id, json.as_str()))
                .collect(),
        };
        self.instance.query_data(request).await
    }

    /// Run a single query and return its response
    pub async fn run_one(&self, json: String) -> DataResponse {
        let mut response = self.run(&[("A", json)]).await;
        response.responses.remove("A").expect("Missing response for A")
    }
}

/// Payload running `statement`, optionally pinned to `host`
pub fn payload(statement: &str, host: Option<&str>) -> String {
    let mut json = serde_json::json!({ "format": "table", "queryText": statement });
    if let Some(host) = host {
        json["queryHost"] = serde_json::Value::from(host);
    }
    json.to_string()
}
