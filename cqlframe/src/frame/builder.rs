// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Frame materialization from a result cursor

use super::{Field, Frame};
use crate::driver::ResultCursor;
use crate::error::Result;
use crate::types::{coerce_value, type_container};

/// Drain `cursor` into a new frame named `name`.
///
/// One field per cursor column, typed by its declared type. Rows are
/// appended in delivery order until the cursor is exhausted; the whole result
/// is held in memory. The cursor is closed afterwards and a close error is
/// only logged: rows read before it stay in the returned frame.
pub async fn build_frame(name: &str, mut cursor: Box<dyn ResultCursor>) -> Result<Frame> {
    let columns = cursor.columns().to_vec();

    let mut frame = Frame::new(name);
    for column in &columns {
        frame
            .fields
            .push(Field::new(column.name.clone(), type_container(&column.declared_type)));
    }

    while let Some(row) = cursor.next_row().await {
        let mut values = Vec::with_capacity(columns.len());
        let mut raw = row.into_iter();
        for column in &columns {
            let value = raw.next().flatten();
            values.push(coerce_value(value, &column.declared_type));
        }
        frame.append_row(values)?;
    }

    log::debug!(
        "Built frame '{}' with {} fields and {} rows",
        frame.name,
        frame.column_count(),
        frame.row_count()
    );

    if let Err(e) = cursor.close().await {
        log::warn!("Closing result cursor failed: {}", e);
    }

    Ok(frame)
}
