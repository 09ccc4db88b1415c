// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Per-target session management
//!
//! A data source keeps one long-lived session per target node selector:
//! - the empty selector routes across the whole cluster
//! - a non-empty selector pins the session to that single node
//!
//! Sessions are created lazily on first use and kept until the owning
//! instance is disposed. There is no eviction and no liveness check.

pub mod cache;

pub use cache::{target_key, SessionCache};
