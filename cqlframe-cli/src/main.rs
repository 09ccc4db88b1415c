// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! cqlframe command-line interface

mod cli;

use clap::Parser;
use colored::Colorize;

use cli::{handle_batch, handle_health, handle_query, load_settings, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Some(level) = cli.log_level {
        builder.filter_level(level.to_level_filter());
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Version => {
            println!("cqlframe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Query { query, node, format } => {
            let settings = load_settings(cli.host, cli.settings, cli.user, cli.password)?;
            handle_query(settings, query, node, format).await
        }
        Commands::Batch { file, format } => {
            let settings = load_settings(cli.host, cli.settings, cli.user, cli.password)?;
            handle_batch(settings, file, format).await
        }
        Commands::Health => {
            let settings = load_settings(cli.host, cli.settings, cli.user, cli.password)?;
            handle_health(settings)
        }
    }
}
