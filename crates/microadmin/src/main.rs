// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::error;

use microadmin::broadcast::Verdict;
use microadmin::config::{AdminConfig, Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&cli.config);

    let code = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match microadmin::run(cli.config).await {
            Ok(()) => 0,
            Err(e) => {
                error!("fatal: {e:#}");
                1
            }
        },
        Command::Refresh { app } => match microadmin::refresh_once(&cli.config, app.as_deref()).await {
            Ok(summary) => {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => error!("failed to encode summary: {e}"),
                }
                if summary.verdict == Verdict::Success {
                    0
                } else {
                    1
                }
            }
            Err(e) => {
                error!("refresh failed: {e:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

fn init_tracing(config: &AdminConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr; stdout carries the `refresh` summary.
    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().with_writer(std::io::stderr).init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
