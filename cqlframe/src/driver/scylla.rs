// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! ScyllaDB / Cassandra driver adapter
//!
//! Translates the `scylla` crate's sessions, row iterators, and `CqlValue`s
//! into the crate's driver boundary types.

use super::options::with_default_port;
use super::{ColumnSpec, Connector, CqlSession, Decimal, DriverValue, ResultCursor, Row, SessionOptions};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use num_bigint::BigInt;
use scylla::frame::response::result::{ColumnType, CqlValue};
use scylla::host_filter::AllowListHostFilter;
use scylla::transport::iterator::RowIterator;
use scylla::{Session, SessionBuilder};
use serde_json::{Map, Value as JsonValue};
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

/// CQL `date` values count days from this offset, centered on the epoch
const CQL_DATE_EPOCH_OFFSET: i64 = 1 << 31;

const SECONDS_PER_DAY: i64 = 86_400;

/// Connector backed by the `scylla` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScyllaConnector;

#[async_trait]
impl Connector for ScyllaConnector {
    type Session = ScyllaSession;

    async fn connect(&self, options: &SessionOptions) -> Result<ScyllaSession> {
        let cluster = &options.cluster;
        let mut builder = SessionBuilder::new().known_node(with_default_port(&cluster.contact_point));

        if let Some(credentials) = &cluster.credentials {
            log::debug!("Using password authentication for user '{}'", credentials.username);
            builder = builder.user(credentials.username.as_str(), credentials.password.as_str());
        }
        if let Some(timeout) = cluster.connect_timeout {
            builder = builder.connection_timeout(timeout);
        }
        if let Some(keyspace) = &cluster.keyspace {
            builder = builder.use_keyspace(keyspace.as_str(), false);
        }
        if let Some(node) = options.node_filter.pinned_node() {
            let addresses = resolve_node(node).await?;
            let filter = AllowListHostFilter::new(addresses).map_err(|e| {
                Error::Connection(format!("Cannot build allow-list for node '{}': {}", node, e))
            })?;
            builder = builder.host_filter(Arc::new(filter));
        }

        let session = builder.build().await.map_err(|e| {
            log::info!(
                "Unable to connect to {} (node filter {}): {}",
                cluster.contact_point,
                options.node_filter,
                e
            );
            Error::Connection(e.to_string())
        })?;

        Ok(ScyllaSession { inner: session })
    }
}

/// Socket addresses of a node name, resolved without blocking the runtime
async fn resolve_node(node: &str) -> Result<Vec<SocketAddr>> {
    let addresses: Vec<SocketAddr> = tokio::net::lookup_host(with_default_port(node))
        .await
        .map_err(|e| Error::Connection(format!("Cannot resolve node '{}': {}", node, e)))?
        .collect();
    if addresses.is_empty() {
        return Err(Error::Connection(format!("Node '{}' resolved to no address", node)));
    }
    Ok(addresses)
}

/// A live `scylla::Session`
pub struct ScyllaSession {
    inner: Session,
}

#[async_trait]
impl CqlSession for ScyllaSession {
    async fn query(&self, statement: &str) -> Result<Box<dyn ResultCursor>> {
        let rows = self
            .inner
            .query_iter(statement, ())
            .await
            .map_err(|e| Error::Query(e.to_string()))?;

        let columns = rows
            .get_column_specs()
            .iter()
            .map(|column| ColumnSpec::new(column.name.clone(), cql_type_name(&column.typ)))
            .collect();

        Ok(Box::new(ScyllaCursor {
            columns,
            rows,
            fetch_error: None,
        }))
    }
}

struct ScyllaCursor {
    columns: Vec<ColumnSpec>,
    rows: RowIterator,
    fetch_error: Option<String>,
}

#[async_trait]
impl ResultCursor for ScyllaCursor {
    fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    async fn next_row(&mut self) -> Option<Row> {
        match self.rows.next().await? {
            Ok(row) => Some(
                row.columns
                    .into_iter()
                    .map(|value| value.and_then(driver_value))
                    .collect(),
            ),
            Err(err) => {
                self.fetch_error = Some(err.to_string());
                None
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let cursor = *self;
        match cursor.fetch_error {
            Some(message) => Err(Error::Query(message)),
            None => Ok(()),
        }
    }
}

/// Type name as CQL spells it; collections and UDTs report their kind only.
pub fn cql_type_name(typ: &ColumnType) -> String {
    let name = match typ {
        ColumnType::Ascii => "ascii",
        ColumnType::Boolean => "boolean",
        ColumnType::Blob => "blob",
        ColumnType::Counter => "counter",
        ColumnType::Date => "date",
        ColumnType::Decimal => "decimal",
        ColumnType::Double => "double",
        ColumnType::Duration => "duration",
        ColumnType::Float => "float",
        ColumnType::Int => "int",
        ColumnType::BigInt => "bigint",
        ColumnType::Text => "varchar",
        ColumnType::Timestamp => "timestamp",
        ColumnType::Inet => "inet",
        ColumnType::List(_) => "list",
        ColumnType::Map(_, _) => "map",
        ColumnType::Set(_) => "set",
        ColumnType::UserDefinedType { .. } => "udt",
        ColumnType::SmallInt => "smallint",
        ColumnType::TinyInt => "tinyint",
        ColumnType::Time => "time",
        ColumnType::Timeuuid => "timeuuid",
        ColumnType::Tuple(_) => "tuple",
        ColumnType::Uuid => "uuid",
        ColumnType::Varint => "varint",
        ColumnType::Custom(name) => return name.to_string(),
        #[allow(unreachable_patterns)]
        _ => "custom",
    };
    name.to_string()
}

fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

fn date_from_days(raw: u32) -> Option<DateTime<Utc>> {
    let days = raw as i64 - CQL_DATE_EPOCH_OFFSET;
    DateTime::<Utc>::from_timestamp(days * SECONDS_PER_DAY, 0)
}

/// Map a driver value onto the closed [`DriverValue`] set. `Empty` reads as NULL.
fn driver_value(value: CqlValue) -> Option<DriverValue> {
    let converted = match value {
        CqlValue::Ascii(text) | CqlValue::Text(text) => DriverValue::Text(text),
        CqlValue::Boolean(b) => DriverValue::Boolean(b),
        CqlValue::Float(f) => DriverValue::Float(f),
        CqlValue::Double(d) => DriverValue::Double(d),
        CqlValue::Int(i) => DriverValue::Int(i),
        CqlValue::BigInt(i) => DriverValue::BigInt(i),
        CqlValue::SmallInt(i) => DriverValue::SmallInt(i),
        CqlValue::TinyInt(i) => DriverValue::TinyInt(i),
        CqlValue::Counter(counter) => DriverValue::BigInt(counter.0),
        CqlValue::Uuid(uuid) => DriverValue::Uuid(uuid),
        CqlValue::Timeuuid(uuid) => DriverValue::Uuid(Uuid::from_bytes(*uuid.as_bytes())),
        CqlValue::Timestamp(ts) => match timestamp_from_millis(ts.0) {
            Some(dt) => DriverValue::Timestamp(dt),
            None => DriverValue::Structured(JsonValue::from(ts.0)),
        },
        CqlValue::Date(date) => match date_from_days(date.0) {
            Some(dt) => DriverValue::Timestamp(dt),
            None => DriverValue::Structured(JsonValue::from(date.0)),
        },
        CqlValue::Decimal(decimal) => {
            let (bytes, scale) = decimal.as_signed_be_bytes_slice_and_exponent();
            DriverValue::Decimal(Decimal::from_signed_bytes_be(bytes, scale))
        }
        CqlValue::Varint(varint) => {
            DriverValue::Varint(BigInt::from_signed_bytes_be(varint.as_signed_bytes_be_slice()))
        }
        CqlValue::Empty => return None,
        other => DriverValue::Structured(to_json(&other)),
    };
    Some(converted)
}

fn to_json(value: &CqlValue) -> JsonValue {
    match value {
        CqlValue::Ascii(s) | CqlValue::Text(s) => JsonValue::from(s.clone()),
        CqlValue::Boolean(b) => JsonValue::Bool(*b),
        CqlValue::Float(f) => JsonValue::from(*f),
        CqlValue::Double(d) => JsonValue::from(*d),
        CqlValue::Int(i) => JsonValue::from(*i),
        CqlValue::BigInt(i) => JsonValue::from(*i),
        CqlValue::SmallInt(i) => JsonValue::from(*i),
        CqlValue::TinyInt(i) => JsonValue::from(*i),
        CqlValue::Counter(c) => JsonValue::from(c.0),
        CqlValue::Uuid(u) => JsonValue::from(u.to_string()),
        CqlValue::Timeuuid(u) => JsonValue::from(Uuid::from_bytes(*u.as_bytes()).to_string()),
        CqlValue::Inet(ip) => JsonValue::from(ip.to_string()),
        CqlValue::Blob(bytes) => JsonValue::from(hex_literal(bytes)),
        CqlValue::Time(time) => JsonValue::from(time.0),
        CqlValue::Timestamp(ts) => match timestamp_from_millis(ts.0) {
            Some(dt) => JsonValue::from(dt.to_rfc3339()),
            None => JsonValue::from(ts.0),
        },
        CqlValue::Date(date) => match date_from_days(date.0) {
            Some(dt) => JsonValue::from(dt.to_rfc3339()),
            None => JsonValue::from(date.0),
        },
        CqlValue::Duration(duration) => {
            let mut object = Map::new();
            object.insert("months".to_string(), JsonValue::from(duration.months));
            object.insert("days".to_string(), JsonValue::from(duration.days));
            object.insert("nanoseconds".to_string(), JsonValue::from(duration.nanoseconds));
            JsonValue::Object(object)
        }
        CqlValue::Decimal(decimal) => {
            let (bytes, scale) = decimal.as_signed_be_bytes_slice_and_exponent();
            JsonValue::from(Decimal::from_signed_bytes_be(bytes, scale).to_string())
        }
        CqlValue::Varint(varint) => {
            JsonValue::from(BigInt::from_signed_bytes_be(varint.as_signed_bytes_be_slice()).to_string())
        }
        CqlValue::Empty => JsonValue::Null,
        CqlValue::List(items) | CqlValue::Set(items) => {
            JsonValue::Array(items.iter().map(to_json).collect())
        }
        CqlValue::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (map_key(k), to_json(v)))
                .collect(),
        ),
        CqlValue::Tuple(values) => JsonValue::Array(
            values
                .iter()
                .map(|v| v.as_ref().map(to_json).unwrap_or(JsonValue::Null))
                .collect(),
        ),
        CqlValue::UserDefinedType { fields, .. } => JsonValue::Object(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), v.as_ref().map(to_json).unwrap_or(JsonValue::Null)))
                .collect(),
        ),
        #[allow(unreachable_patterns)]
        other => JsonValue::from(format!("{:?}", other)),
    }
}

fn map_key(key: &CqlValue) -> String {
    match to_json(key) {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_node_literal_addresses() {
        let v4 = resolve_node("127.0.0.1").await.unwrap();
        assert_eq!(v4, vec!["127.0.0.1:9042".parse::<SocketAddr>().unwrap()]);

        let v6 = resolve_node("[::1]:9100").await.unwrap();
        assert_eq!(v6, vec!["[::1]:9100".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_resolve_node_rejects_malformed_name() {
        let err = resolve_node("10.0.0.1:notaport").await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_cql_type_names() {
        assert_eq!(cql_type_name(&ColumnType::Int), "int");
        assert_eq!(cql_type_name(&ColumnType::Text), "varchar");
        assert_eq!(cql_type_name(&ColumnType::Blob), "blob");
        assert_eq!(cql_type_name(&ColumnType::List(Box::new(ColumnType::Int))), "list");
    }

    #[test]
    fn test_scalar_values_map_to_driver_values() {
        assert_eq!(driver_value(CqlValue::Int(7)), Some(DriverValue::Int(7)));
        assert_eq!(
            driver_value(CqlValue::Ascii("a".to_string())),
            Some(DriverValue::Text("a".to_string()))
        );
        assert_eq!(driver_value(CqlValue::Empty), None);
    }

    #[test]
    fn test_collections_become_structured() {
        let list = CqlValue::List(vec![CqlValue::Int(1), CqlValue::Int(2)]);
        assert_eq!(
            driver_value(list),
            Some(DriverValue::Structured(serde_json::json!([1, 2])))
        );

        let map = CqlValue::Map(vec![(CqlValue::Text("k".to_string()), CqlValue::Boolean(true))]);
        assert_eq!(
            driver_value(map),
            Some(DriverValue::Structured(serde_json::json!({"k": true})))
        );
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(hex_literal(&[0xde, 0xad, 0x01]), "0xdead01");
    }
}
