// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster configuration and per-session options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Native protocol port appended to node names that carry none
pub const DEFAULT_CQL_PORT: u16 = 9042;

/// Password authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection parameters shared by every session of a data source instance.
///
/// Never mutated after construction. Each session-creation attempt derives its
/// own [`SessionOptions`] via [`ClusterConfig::session_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub contact_point: String,
    pub credentials: Option<Credentials>,
    pub keyspace: Option<String>,
    pub connect_timeout: Option<Duration>,
    /// Deadline for executing one statement and fetching all of its rows
    pub request_timeout: Option<Duration>,
}

impl ClusterConfig {
    pub fn new(contact_point: impl Into<String>) -> Self {
        Self {
            contact_point: contact_point.into(),
            credentials: None,
            keyspace: None,
            connect_timeout: None,
            request_timeout: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Options for a session pinned to `target`; an empty target means
    /// cluster-wide routing.
    pub fn session_options(&self, target: &str) -> SessionOptions {
        let node_filter = if target.is_empty() {
            NodeFilter::All
        } else {
            NodeFilter::Only(target.to_string())
        };
        SessionOptions {
            cluster: self.clone(),
            node_filter,
        }
    }
}

/// Which cluster nodes a session may route requests to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeFilter {
    /// Normal topology-aware routing across the whole cluster
    All,
    /// Single-node allow-list
    Only(String),
}

impl NodeFilter {
    pub fn pinned_node(&self) -> Option<&str> {
        match self {
            NodeFilter::All => None,
            NodeFilter::Only(node) => Some(node),
        }
    }
}

impl fmt::Display for NodeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeFilter::All => write!(f, "<cluster>"),
            NodeFilter::Only(node) => write!(f, "{}", node),
        }
    }
}

/// Immutable input to one session-creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub cluster: ClusterConfig,
    pub node_filter: NodeFilter,
}

/// `host` as `host:port`, adding the default CQL port when none is given.
/// Bracketed and bare IPv6 literals are handled.
pub fn with_default_port(host: &str) -> String {
    if host.starts_with('[') {
        if host.contains("]:") {
            return host.to_string();
        }
        return format!("{}:{}", host, DEFAULT_CQL_PORT);
    }
    match host.matches(':').count() {
        0 => format!("{}:{}", host, DEFAULT_CQL_PORT),
        1 => host.to_string(),
        _ => format!("[{}]:{}", host, DEFAULT_CQL_PORT),
    }
}
