// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for cqlframe
//!
//! Provides one-off query execution, batch execution from a file, and the
//! data source health probe.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_batch, handle_health, handle_query, load_settings};
