// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for cqlframe

use colored::Colorize;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::commands::OutputFormat;
use super::output::{format_frame, format_response};
use cqlframe::datasource::settings::{SECURE_PASSWORD_KEY, SECURE_USER_KEY};
use cqlframe::{
    Connector, DataQuery, DataResponse, DataSourceInstance, DataSourceSettings, HealthStatus,
    QueryDataRequest,
};

/// One entry of a batch file
#[derive(Debug, Deserialize)]
struct BatchEntry {
    #[serde(rename = "refId")]
    ref_id: String,
    json: JsonValue,
}

#[derive(Debug, Deserialize)]
struct BatchFile {
    queries: Vec<BatchEntry>,
}

/// Build instance settings from the settings file, the `--host` override,
/// and the credential flags. The password is prompted for when a user is
/// given without one.
pub fn load_settings(
    host: Option<String>,
    settings: Option<PathBuf>,
    user: Option<String>,
    password: Option<String>,
) -> Result<DataSourceSettings, Box<dyn std::error::Error>> {
    let mut document = match &settings {
        Some(path) => read_settings_document(path)?,
        None => Map::new(),
    };
    if let Some(host) = host {
        document.insert("host".to_string(), JsonValue::String(host));
    }

    let mut secure = HashMap::new();
    if let Some(user) = user {
        let password = match password {
            Some(pwd) => pwd,
            None => {
                print!("Password for {}: ", user);
                std::io::Write::flush(&mut std::io::stdout())?;
                rpassword::read_password()?
            }
        };
        secure.insert(SECURE_USER_KEY.to_string(), user);
        secure.insert(SECURE_PASSWORD_KEY.to_string(), password);
    }

    let json = serde_json::to_vec(&JsonValue::Object(document))?;
    Ok(DataSourceSettings::from_json(&json, &secure)?)
}

fn read_settings_document(path: &Path) -> Result<Map<String, JsonValue>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read settings file {:?}: {}", path, e))?;
    let document: JsonValue = serde_json::from_str(&text)?;
    match document {
        JsonValue::Object(map) => Ok(map),
        _ => Err(format!("Settings file {:?} must hold a JSON object", path).into()),
    }
}

/// Read a batch file into a request
pub fn read_batch_file(path: &Path) -> Result<QueryDataRequest, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read batch file {:?}: {}", path, e))?;
    let batch: BatchFile = serde_json::from_str(&text)?;
    let queries = batch
        .queries
        .into_iter()
        .map(|entry| DataQuery::new(entry.ref_id, entry.json.to_string()))
        .collect();
    Ok(QueryDataRequest { queries })
}

/// Query payload for a single statement
pub fn query_payload(query: &str, node: Option<&str>) -> String {
    let mut payload = serde_json::json!({ "format": "table", "queryText": query });
    if let Some(node) = node {
        payload["queryHost"] = JsonValue::from(node);
    }
    payload.to_string()
}

/// Run one statement through `instance`
pub async fn run_query<C: Connector>(
    instance: &DataSourceInstance<C>,
    query: &str,
    node: Option<&str>,
) -> DataResponse {
    let request = QueryDataRequest {
        queries: vec![DataQuery::new("A", query_payload(query, node))],
    };
    let mut response = instance.query_data(request).await;
    response.responses.remove("A").unwrap_or_default()
}

/// Handle the query command
pub async fn handle_query(
    settings: DataSourceSettings,
    query: String,
    node: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let instance = DataSourceInstance::scylla(settings);
    let response = run_query(&instance, &query, node.as_deref()).await;
    instance.dispose();

    if let Some(error) = response.error {
        return Err(error.into());
    }
    for frame in &response.frames {
        println!("{}", format_frame(frame, format));
    }
    Ok(())
}

/// Handle the batch command
pub async fn handle_batch(
    settings: DataSourceSettings,
    file: PathBuf,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_batch_file(&file)?;
    if request.queries.is_empty() {
        println!("{}", "Batch file holds no queries".yellow());
        return Ok(());
    }

    let instance = DataSourceInstance::scylla(settings);
    let response = instance.query_data(request).await;
    instance.dispose();

    println!("{}", format_response(&response, format));

    let failed = response.responses.values().filter(|r| r.is_error()).count();
    if failed > 0 {
        eprintln!(
            "{}",
            format!("{} of {} queries failed", failed, response.responses.len()).yellow()
        );
    }
    Ok(())
}

/// Handle the health command
pub fn handle_health(settings: DataSourceSettings) -> Result<(), Box<dyn std::error::Error>> {
    let instance = DataSourceInstance::scylla(settings);
    let health = instance.check_health();
    match health.status {
        HealthStatus::Ok => println!("{}", health.message.green()),
        HealthStatus::Error => return Err(health.message.into()),
    }
    Ok(())
}
