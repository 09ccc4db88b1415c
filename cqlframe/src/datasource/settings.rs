// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data source instance settings

use crate::driver::{ClusterConfig, Credentials};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Secure-map key holding the user name
pub const SECURE_USER_KEY: &str = "user";
/// Secure-map key holding the password
pub const SECURE_PASSWORD_KEY: &str = "password";

/// Settings of one data source instance.
///
/// The public part is a JSON document such as
/// `{"host": "10.0.0.1", "keyspace": "metrics", "connectTimeoutMs": 5000}`.
/// Credentials come separately from the decrypted secure map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl DataSourceSettings {
    /// Parse the public settings document and pick credentials out of
    /// `secure`. Password authentication is configured only when both the
    /// user and the password are present.
    pub fn from_json(json: &[u8], secure: &HashMap<String, String>) -> Result<Self> {
        let mut settings: DataSourceSettings = serde_json::from_slice(json).map_err(|e| {
            log::warn!("Invalid data source settings: {}", e);
            Error::Config(format!("invalid settings document: {}", e))
        })?;

        settings.host = settings.host.trim().to_string();
        if settings.host.is_empty() {
            return Err(Error::Config("settings must name a contact host".to_string()));
        }
        log::info!("Configuring data source for host {}", settings.host);

        if let (Some(user), Some(password)) = (
            secure.get(SECURE_USER_KEY),
            secure.get(SECURE_PASSWORD_KEY),
        ) {
            log::debug!("Using username and password for user '{}'", user);
            settings.credentials = Some(Credentials {
                username: user.clone(),
                password: password.clone(),
            });
        }

        Ok(settings)
    }

    /// Immutable cluster configuration shared by every session of the instance
    pub fn cluster_config(&self) -> ClusterConfig {
        let mut cluster = ClusterConfig::new(self.host.clone());
        if let Some(credentials) = &self.credentials {
            cluster = cluster.with_credentials(credentials.username.clone(), credentials.password.clone());
        }
        if let Some(keyspace) = self.keyspace.as_deref().filter(|k| !k.is_empty()) {
            cluster = cluster.with_keyspace(keyspace);
        }
        if let Some(ms) = self.connect_timeout_ms.filter(|ms| *ms > 0) {
            cluster = cluster.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.request_timeout_ms.filter(|ms| *ms > 0) {
            cluster = cluster.with_request_timeout(Duration::from_millis(ms));
        }
        cluster
    }
}
