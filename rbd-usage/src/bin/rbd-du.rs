// SPDX-License-Identifier: GPL-3.0-only

//! CLI for querying RBD image disk usage
//!
//! Prints machine-readable JSON on stdout in both the success and failure
//! case; callers distinguish them by exit code and the presence of an
//! `error` key. Logs go to stderr so stdout stays scrapeable.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rbd_usage::{ClusterCredentials, ImageUsageCalculator, RadosBackend, summarize};
use rbd_types::UsageSummary;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "rbd-du")]
#[command(about = "Report provisioned and used bytes of an RBD image")]
struct Cli {
    /// Image name within the pool
    image_name: String,

    /// Pool to look the image up in
    #[arg(default_value = "rbd")]
    pool_name: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let failure = json!({
                "error": error.to_string(),
                "image_name": cli.image_name,
                "pool_name": cli.pool_name,
            });
            let rendered = serde_json::to_string_pretty(&failure)
                .unwrap_or_else(|_| r#"{"error":"failed to render error report"}"#.to_string());
            println!("{rendered}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let credentials = ClusterCredentials::from_env()?;
    let backend = RadosBackend::new();
    let calculator = ImageUsageCalculator::new(&backend, credentials);

    let report = calculator.compute(&cli.pool_name, &cli.image_name)?;
    let summary: UsageSummary = summarize(&report, &cli.image_name, &cli.pool_name);

    Ok(serde_json::to_string_pretty(&summary)?)
}
