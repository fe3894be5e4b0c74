//! SmsRelay CLI
//!
//! Command-line interface for the Alertmanager-to-SMS relay.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use smsrelay::api::{AppState, HttpServer};
use smsrelay::models::AlertBatch;
use smsrelay::relay::{render, should_process};

/// SmsRelay - Alertmanager alerts as SMS
#[derive(Parser)]
#[command(name = "smsrelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SMSRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook receiver
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the messages a webhook payload would produce, without sending
    Render {
        /// Path to an Alertmanager webhook JSON payload
        payload: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match smsrelay::Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    smsrelay::logging::init(&config.logging, cli.verbose);

    let result = match cli.command {
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Render { payload } => run_render(&payload),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_serve(
    mut config: smsrelay::Config,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!(sms_provider = ?config.sms_provider, "Loaded configuration");

    let relay = smsrelay::build_relay(&config.sms_provider)
        .context("SMS provider is not fully configured")?;

    HttpServer::new(AppState::new(relay))
        .serve(&config.server.addr())
        .await?;

    Ok(())
}

fn run_render(payload: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(payload)
        .with_context(|| format!("reading {}", payload.display()))?;
    let batch: AlertBatch = serde_json::from_str(&text).context("parsing webhook payload")?;

    for (i, alert) in batch.alerts.iter().enumerate() {
        if should_process(alert) {
            println!("--- alert {} ---\n{}\n", i + 1, render(alert));
        } else {
            println!(
                "--- alert {} skipped (status: {}, severity: {}) ---\n",
                i + 1,
                alert.status,
                alert.label("severity")
            );
        }
    }

    Ok(())
}
