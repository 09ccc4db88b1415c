// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Declared-type mapping and per-value coercion

use super::{FieldKind, FieldVector, WireValue};
use crate::driver::DriverValue;

/// Value reported for every non-null cell of a `blob` column
pub const BLOB_PLACEHOLDER: &str = "Blob";

/// Column element type for a declared CQL type. Total: unknown types map to
/// [`FieldKind::String`].
pub fn field_kind(declared: &str) -> FieldKind {
    match declared {
        "timestamp" => FieldKind::Time,
        "bigint" | "int" => FieldKind::Int64,
        "smallint" => FieldKind::Int16,
        "boolean" => FieldKind::Bool,
        "double" | "varint" | "decimal" => FieldKind::Float64,
        "float" => FieldKind::Float32,
        "tinyint" => FieldKind::Int8,
        _ => FieldKind::String,
    }
}

/// Empty container declaring a column's static type
pub fn type_container(declared: &str) -> FieldVector {
    log::trace!("Type container for declared type '{}'", declared);
    FieldVector::new(field_kind(declared))
}

/// Convert a driver value to a wire-safe value.
///
/// Never fails. NULL stays NULL, `blob` columns report [`BLOB_PLACEHOLDER`],
/// everything else dispatches on the value's runtime variant. Decimals and
/// varints lose precision on the way to `f64`, and become `0` when their
/// text does not parse to a finite float.
pub fn coerce_value(raw: Option<DriverValue>, declared: &str) -> Option<WireValue> {
    let raw = raw?;
    if declared == "blob" {
        return Some(WireValue::String(BLOB_PLACEHOLDER.to_string()));
    }

    let value = match raw {
        DriverValue::Float(f) => WireValue::Float32(f),
        DriverValue::Timestamp(t) => WireValue::Time(t),
        DriverValue::Text(s) => WireValue::String(s),
        DriverValue::BigInt(i) => WireValue::Int64(i),
        DriverValue::Double(d) => WireValue::Float64(d),
        DriverValue::Boolean(b) => WireValue::Bool(b),
        DriverValue::SmallInt(i) => WireValue::Int16(i),
        DriverValue::TinyInt(i) => WireValue::Int8(i),
        DriverValue::Uuid(u) => WireValue::String(u.hyphenated().to_string()),
        DriverValue::Int(i) => WireValue::Int64(i as i64),
        DriverValue::Decimal(d) => WireValue::Float64(decimal_text_to_f64(&d.to_string())),
        DriverValue::Varint(v) => WireValue::Float64(decimal_text_to_f64(&v.to_string())),
        DriverValue::Structured(doc) => WireValue::String(serde_json::to_string(&doc).unwrap_or_else(|e| {
            log::info!("Serializing {} value failed: {}", declared, e);
            String::new()
        })),
    };
    Some(value)
}

/// Parse decimal text as `f64`; unparseable or out-of-range text yields `0`
pub fn decimal_text_to_f64(text: &str) -> f64 {
    match text.parse::<f64>() {
        Ok(value) if !value.is_infinite() => value,
        Ok(_) => {
            log::debug!("Decimal '{}' is out of f64 range, using 0", text);
            0.0
        }
        Err(e) => {
            log::debug!("Decimal '{}' does not parse as f64 ({}), using 0", text, e);
            0.0
        }
    }
}
