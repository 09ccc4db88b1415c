// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Column element types and value coercion
//!
//! This module is the single source of truth for how a declared CQL column
//! type maps to a frame column type, and how driver values become
//! wire-safe values:
//! - [`field_kind`] / [`type_container`] - declared type to column type
//! - [`coerce_value`] - driver value to [`WireValue`]
//! - [`FieldVector`] - typed column storage

pub mod coerce;
pub mod vector;

pub use coerce::{coerce_value, decimal_text_to_f64, field_kind, type_container, BLOB_PLACEHOLDER};
pub use vector::FieldVector;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

/// Static element type of a frame column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Time,
    Int64,
    Int16,
    Int8,
    Bool,
    Float64,
    Float32,
    /// Fallback for unrecognized and opaque declared types
    String,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Time => "time",
            FieldKind::Int64 => "int64",
            FieldKind::Int16 => "int16",
            FieldKind::Int8 => "int8",
            FieldKind::Bool => "bool",
            FieldKind::Float64 => "float64",
            FieldKind::Float32 => "float32",
            FieldKind::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// A wire-safe scalar value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Time(DateTime<Utc>),
    Int64(i64),
    Int16(i16),
    Int8(i8),
    Bool(bool),
    Float64(f64),
    Float32(f32),
    String(String),
}

impl WireValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            WireValue::Time(_) => FieldKind::Time,
            WireValue::Int64(_) => FieldKind::Int64,
            WireValue::Int16(_) => FieldKind::Int16,
            WireValue::Int8(_) => FieldKind::Int8,
            WireValue::Bool(_) => FieldKind::Bool,
            WireValue::Float64(_) => FieldKind::Float64,
            WireValue::Float32(_) => FieldKind::Float32,
            WireValue::String(_) => FieldKind::String,
        }
    }

    /// Convert to a value of `kind` without losing information.
    ///
    /// String columns accept any value in its textual form. Integers widen,
    /// `Float32` widens to `Float64`. Returns `None` when no lossless
    /// conversion exists.
    pub fn convert_to(self, kind: FieldKind) -> Option<WireValue> {
        if self.kind() == kind {
            return Some(self);
        }
        match (kind, self) {
            (FieldKind::String, value) => Some(WireValue::String(value.to_string())),
            (FieldKind::Int64, WireValue::Int16(i)) => Some(WireValue::Int64(i as i64)),
            (FieldKind::Int64, WireValue::Int8(i)) => Some(WireValue::Int64(i as i64)),
            (FieldKind::Int16, WireValue::Int8(i)) => Some(WireValue::Int16(i as i16)),
            (FieldKind::Float64, WireValue::Float32(f)) => Some(WireValue::Float64(f as f64)),
            (FieldKind::Float64, WireValue::Int16(i)) => Some(WireValue::Float64(i as f64)),
            (FieldKind::Float64, WireValue::Int8(i)) => Some(WireValue::Float64(i as f64)),
            (FieldKind::Float32, WireValue::Int8(i)) => Some(WireValue::Float32(i as f32)),
            _ => None,
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Time(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            WireValue::Int64(i) => write!(f, "{}", i),
            WireValue::Int16(i) => write!(f, "{}", i),
            WireValue::Int8(i) => write!(f, "{}", i),
            WireValue::Bool(b) => write!(f, "{}", b),
            WireValue::Float64(x) => write!(f, "{}", x),
            WireValue::Float32(x) => write!(f, "{}", x),
            WireValue::String(s) => write!(f, "{}", s),
        }
    }
}
