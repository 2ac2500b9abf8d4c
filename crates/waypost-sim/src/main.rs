// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Waypost Sim — replays a scenario through a headless navigator.
//
// Usage: waypost-sim <scenario.json>
//
// Logs go to stderr; the final stacks and visit states are printed to stdout
// as JSON.

mod report;
mod runner;
mod scenario;

use std::process::ExitCode;

use tracing::{error, info};

use runner::Simulator;
use scenario::Scenario;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: waypost-sim <scenario.json>");
        return ExitCode::from(2);
    };

    match simulate(&path).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path = %path, error = %e, "simulation failed");
            ExitCode::FAILURE
        }
    }
}

async fn simulate(path: &str) -> waypost_core::Result<String> {
    let scenario = Scenario::load(path)?;
    info!(path, steps = scenario.steps.len(), "scenario loaded");

    let mut simulator = Simulator::new(scenario.config, scenario.rules);
    simulator.run(scenario.steps).await;
    Ok(serde_json::to_string_pretty(&simulator.report())?)
}
