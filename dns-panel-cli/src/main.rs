//! DNS Panel terminal front end
//!
//! Drives the record list and resource list controllers from a line-oriented
//! shell.
//!
//! # Usage
//! ```bash
//! # Open the records of domain 1 right away
//! dns-panel --base-url http://127.0.0.1:8000 1 example.com
//!
//! # Base URL from the environment or the config file
//! DNS_PANEL_BASE_URL=http://127.0.0.1:8000 dns-panel
//! ```

mod config;
mod shell;
mod terminal_view;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dns_panel_client::RestClient;
use dns_panel_core::types::RecordCommand;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Settings;
use shell::Shell;
use terminal_view::{input_lines, TerminalView};

#[derive(Parser)]
#[command(name = "dns-panel")]
#[command(about = "Manage DNS records of a DNS panel backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Backend base URL, e.g. http://127.0.0.1:8000
    #[arg(long, env = "DNS_PANEL_BASE_URL")]
    base_url: Option<String>,

    /// Config file (default: <config dir>/dns-panel/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Domain id to open on start
    #[arg(requires = "domain")]
    domain_id: Option<String>,

    /// Domain name of `domain_id`
    domain: Option<String>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // stdout 留给交互输出
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let file = config::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&file, cli.base_url.as_deref())?;
    tracing::info!("Using backend {}", settings.client.base_url);

    let api = Arc::new(RestClient::new(&settings.client).context("failed to build HTTP client")?);
    let input = input_lines(Box::new(tokio::io::BufReader::new(tokio::io::stdin())));
    let view = Arc::new(TerminalView::new(
        Box::new(std::io::stdout()),
        Arc::clone(&input),
    ));
    let shell = Shell::new(&api, &view, input, &settings.controller)?;

    if let (Some(domain_id), Some(domain_name)) = (cli.domain_id, cli.domain) {
        shell
            .records()
            .dispatch(RecordCommand::Open {
                domain_id,
                domain_name,
            })
            .await;
    } else {
        view.print("Type help for commands.");
    }

    shell.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
