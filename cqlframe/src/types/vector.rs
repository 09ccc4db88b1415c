// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Typed column storage

use super::{FieldKind, WireValue};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Values of one column, all of the same element type. `None` is NULL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum FieldVector {
    Time(Vec<Option<DateTime<Utc>>>),
    Int64(Vec<Option<i64>>),
    Int16(Vec<Option<i16>>),
    Int8(Vec<Option<i8>>),
    Bool(Vec<Option<bool>>),
    Float64(Vec<Option<f64>>),
    Float32(Vec<Option<f32>>),
    String(Vec<Option<String>>),
}

impl FieldVector {
    /// Empty vector of the given element type
    pub fn new(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Time => FieldVector::Time(Vec::new()),
            FieldKind::Int64 => FieldVector::Int64(Vec::new()),
            FieldKind::Int16 => FieldVector::Int16(Vec::new()),
            FieldKind::Int8 => FieldVector::Int8(Vec::new()),
            FieldKind::Bool => FieldVector::Bool(Vec::new()),
            FieldKind::Float64 => FieldVector::Float64(Vec::new()),
            FieldKind::Float32 => FieldVector::Float32(Vec::new()),
            FieldKind::String => FieldVector::String(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldVector::Time(_) => FieldKind::Time,
            FieldVector::Int64(_) => FieldKind::Int64,
            FieldVector::Int16(_) => FieldKind::Int16,
            FieldVector::Int8(_) => FieldKind::Int8,
            FieldVector::Bool(_) => FieldKind::Bool,
            FieldVector::Float64(_) => FieldKind::Float64,
            FieldVector::Float32(_) => FieldKind::Float32,
            FieldVector::String(_) => FieldKind::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldVector::Time(v) => v.len(),
            FieldVector::Int64(v) => v.len(),
            FieldVector::Int16(v) => v.len(),
            FieldVector::Int8(v) => v.len(),
            FieldVector::Bool(v) => v.len(),
            FieldVector::Float64(v) => v.len(),
            FieldVector::Float32(v) => v.len(),
            FieldVector::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value, converting it to this vector's element type.
    ///
    /// Values without a lossless conversion are stored as NULL.
    pub fn push(&mut self, value: Option<WireValue>) {
        let kind = self.kind();
        let value = match value {
            Some(value) => {
                let source = value.kind();
                let converted = value.convert_to(kind);
                if converted.is_none() {
                    log::debug!("Dropping {} value appended to {} column", source, kind);
                }
                converted
            }
            None => None,
        };

        match (self, value) {
            (FieldVector::Time(v), Some(WireValue::Time(x))) => v.push(Some(x)),
            (FieldVector::Int64(v), Some(WireValue::Int64(x))) => v.push(Some(x)),
            (FieldVector::Int16(v), Some(WireValue::Int16(x))) => v.push(Some(x)),
            (FieldVector::Int8(v), Some(WireValue::Int8(x))) => v.push(Some(x)),
            (FieldVector::Bool(v), Some(WireValue::Bool(x))) => v.push(Some(x)),
            (FieldVector::Float64(v), Some(WireValue::Float64(x))) => v.push(Some(x)),
            (FieldVector::Float32(v), Some(WireValue::Float32(x))) => v.push(Some(x)),
            (FieldVector::String(v), Some(WireValue::String(x))) => v.push(Some(x)),
            (vector, _) => vector.push_null(),
        }
    }

    fn push_null(&mut self) {
        match self {
            FieldVector::Time(v) => v.push(None),
            FieldVector::Int64(v) => v.push(None),
            FieldVector::Int16(v) => v.push(None),
            FieldVector::Int8(v) => v.push(None),
            FieldVector::Bool(v) => v.push(None),
            FieldVector::Float64(v) => v.push(None),
            FieldVector::Float32(v) => v.push(None),
            FieldVector::String(v) => v.push(None),
        }
    }

    /// Value at `index`: `None` when out of range, `Some(None)` for NULL
    pub fn get(&self, index: usize) -> Option<Option<WireValue>> {
        match self {
            FieldVector::Time(v) => v.get(index).map(|x| x.map(WireValue::Time)),
            FieldVector::Int64(v) => v.get(index).map(|x| x.map(WireValue::Int64)),
            FieldVector::Int16(v) => v.get(index).map(|x| x.map(WireValue::Int16)),
            FieldVector::Int8(v) => v.get(index).map(|x| x.map(WireValue::Int8)),
            FieldVector::Bool(v) => v.get(index).map(|x| x.map(WireValue::Bool)),
            FieldVector::Float64(v) => v.get(index).map(|x| x.map(WireValue::Float64)),
            FieldVector::Float32(v) => v.get(index).map(|x| x.map(WireValue::Float32)),
            FieldVector::String(v) => v.get(index).map(|x| x.clone().map(WireValue::String)),
        }
    }
}
