// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Output formatting for frames and batch responses

use comfy_table::{Cell, ContentArrangement, Table};
use cqlframe::{DataResponse, Frame, QueryDataResponse, WireValue};

use super::commands::OutputFormat;

/// Formats a single frame
pub fn format_frame(frame: &Frame, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(frame),
        OutputFormat::Json => {
            serde_json::to_string_pretty(frame).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
        OutputFormat::Csv => format_csv(frame),
    }
}

/// Formats every response of a batch, in reference id order
pub fn format_response(response: &QueryDataResponse, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(response).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
    }

    let mut sections = Vec::new();
    for (ref_id, result) in &response.responses {
        sections.push(format!("[{}]\n{}", ref_id, format_data_response(result, format)));
    }
    sections.join("\n\n")
}

fn format_data_response(response: &DataResponse, format: OutputFormat) -> String {
    match &response.error {
        Some(error) => format!("Error: {}", error),
        None => response
            .frames
            .iter()
            .map(|frame| format_frame(frame, format))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_table(frame: &Frame) -> String {
    if frame.is_empty() {
        return "(no columns)".to_string();
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(
        frame
            .fields
            .iter()
            .map(|field| Cell::new(format!("{}\n{}", field.name, field.kind()))),
    );
    for row in frame.rows() {
        table.add_row(row.iter().map(|value| Cell::new(cell_text(value))));
    }

    let rows = frame.row_count();
    format!("{}\n({} {})", table, rows, if rows == 1 { "row" } else { "rows" })
}

fn format_csv(frame: &Frame) -> String {
    let mut output = String::new();
    if frame.is_empty() {
        return output;
    }

    let header: Vec<String> = frame.fields.iter().map(|f| escape_csv(&f.name)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in frame.rows() {
        let values: Vec<String> = row
            .iter()
            .map(|value| match value {
                Some(value) => escape_csv(&value.to_string()),
                None => String::new(),
            })
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }
    output
}

fn cell_text(value: &Option<WireValue>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "null".to_string(),
    }
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
