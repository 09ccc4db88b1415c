// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Query payload model

use crate::error::Result;
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Typed subset of the payload. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct TypedFields {
    #[serde(default)]
    format: Option<String>,
    #[serde(rename = "queryTxt", default)]
    query_txt: Option<String>,
}

/// A decoded query payload.
///
/// `queryText` is the statement that gets executed. `queryTxt` is accepted
/// (and type-checked) for older clients but never executed.
#[derive(Debug, Clone, Default)]
pub struct QueryModel {
    pub format: String,
    pub query_txt: Option<String>,
    fields: Map<String, Value>,
}

impl QueryModel {
    pub fn parse(json: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(json)?;
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(serde_json::Error::custom(format!(
                    "query payload must be a JSON object, got {}",
                    json_type(&other)
                ))
                .into())
            }
        };
        let typed: TypedFields = serde_json::from_value(Value::Object(fields.clone()))?;

        Ok(Self {
            format: typed.format.unwrap_or_default(),
            query_txt: typed.query_txt,
            fields,
        })
    }

    /// Statement to execute; absent, null, and empty all mean "none"
    pub fn query_text(&self) -> Option<String> {
        self.text_field("queryText")
    }

    /// Target node selector
    pub fn query_host(&self) -> Option<String> {
        self.text_field("queryHost")
    }

    /// Free-form access to any payload field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field rendered as text: strings verbatim, other values as JSON text
    fn text_field(&self, name: &str) -> Option<String> {
        let text = match self.fields.get(name)? {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
