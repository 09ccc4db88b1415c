// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Typed frames
//!
//! A [`Frame`] is a named table of typed columns ([`Field`]s). Frames are
//! append-only while a [`builder`] fills them and are handed to callers as
//! plain values.

pub mod builder;

pub use builder::build_frame;

use crate::error::{Error, Result};
use crate::types::{FieldKind, FieldVector, WireValue};
use serde::Serialize;

/// Name given to the single frame produced per query
pub const RESPONSE_FRAME_NAME: &str = "response";

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub values: FieldVector,
}

impl Field {
    pub fn new(name: impl Into<String>, values: FieldVector) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.values.kind()
    }
}

/// A named table of typed columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Number of rows; all fields have equal length
    pub fn row_count(&self) -> usize {
        self.fields.first().map(|f| f.values.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    /// No fields (and therefore no rows)
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append one row, one value per field in field order
    pub fn append_row(&mut self, row: Vec<Option<WireValue>>) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(Error::Frame(format!(
                "row has {} values but frame '{}' has {} fields",
                row.len(),
                self.name,
                self.fields.len()
            )));
        }
        for (field, value) in self.fields.iter_mut().zip(row) {
            field.values.push(value);
        }
        Ok(())
    }

    /// Row at `index`, in field order
    pub fn row(&self, index: usize) -> Option<Vec<Option<WireValue>>> {
        if index >= self.row_count() {
            return None;
        }
        self.fields.iter().map(|f| f.values.get(index)).collect()
    }

    /// All rows, in field order
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<WireValue>>> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_frame() -> Frame {
        Frame::new("t")
            .with_field(Field::new("id", FieldVector::new(FieldKind::Int64)))
            .with_field(Field::new("name", FieldVector::new(FieldKind::String)))
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(RESPONSE_FRAME_NAME);
        assert!(frame.is_empty());
        assert_eq!(frame.row_count(), 0);
        assert_eq!(frame.column_count(), 0);
    }

    #[test]
    fn test_append_and_read_rows() {
        let mut frame = two_column_frame();
        frame
            .append_row(vec![Some(WireValue::Int64(1)), Some(WireValue::String("a".into()))])
            .unwrap();
        frame.append_row(vec![Some(WireValue::Int64(2)), None]).unwrap();

        assert_eq!(frame.row_count(), 2);
        let rows: Vec<_> = frame.rows().collect();
        assert_eq!(rows[1], vec![Some(WireValue::Int64(2)), None]);
        assert!(frame.row(2).is_none());
    }

    #[test]
    fn test_append_row_length_mismatch() {
        let mut frame = two_column_frame();
        let err = frame.append_row(vec![Some(WireValue::Int64(1))]).unwrap_err();
        assert!(matches!(err, Error::Frame(_)));
        assert_eq!(frame.row_count(), 0);
    }

    #[test]
    fn test_frame_json_shape() {
        let mut frame = two_column_frame();
        frame.append_row(vec![Some(WireValue::Int64(7)), None]).unwrap();
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "t",
                "fields": [
                    {"name": "id", "type": "int64", "values": [7]},
                    {"name": "name", "type": "string", "values": [null]},
                ]
            })
        );
    }
}
