//! beacon-engine - discoverability scoring CLI
//!
//! Runs a batch analysis over one or more URLs (plus optional
//! competitor groups) and prints the result as JSON. Provider
//! credentials resolve from `BEACON_*` environment variables and
//! `~/.config/beacon/beacon.toml`; unconfigured providers degrade to
//! estimates rather than failing the scan.

use anyhow::{bail, Context, Result};
use beacon_common::config::{default_config_path, load_toml_config, ProviderCredentials};
use beacon_engine::{Analyzer, AnalyzerLimits, CompetitorGroup};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beacon-engine", about = "Search & AI discoverability scoring")]
struct Cli {
    /// URLs to analyze (bare hosts get https://)
    #[arg(required = true)]
    urls: Vec<String>,

    /// Competitor group as name=url1,url2 (repeatable, up to 4)
    #[arg(long, value_name = "NAME=URLS")]
    competitor: Vec<String>,

    /// Config file path (default: ~/.config/beacon/beacon.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Concurrent URL analyses
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Caller identity for admission control
    #[arg(long, default_value = "cli")]
    caller: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn parse_competitor(raw: &str) -> Result<CompetitorGroup> {
    let (name, urls) = raw
        .split_once('=')
        .with_context(|| format!("expected name=url1,url2 in '{}'", raw))?;
    let urls: Vec<String> = urls
        .split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect();
    if name.trim().is_empty() || urls.is_empty() {
        bail!("expected name=url1,url2 in '{}'", raw);
    }
    Ok(CompetitorGroup {
        name: name.trim().to_string(),
        urls,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(default_config_path)
        .context("could not determine config path")?;
    let config = load_toml_config(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    info!("Starting beacon-engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let credentials = ProviderCredentials::resolve(&config);
    let competitor_groups: Vec<CompetitorGroup> = cli
        .competitor
        .iter()
        .map(|raw| parse_competitor(raw))
        .collect::<Result<_>>()?;

    let analyzer = Analyzer::from_credentials(&credentials).with_limits(AnalyzerLimits {
        max_concurrency: cli.concurrency.max(1),
        ..AnalyzerLimits::default()
    });

    // Ctrl-C cancels every in-flight provider call.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let batch = analyzer
        .analyze_batch(&cli.caller, &cli.urls, &competitor_groups, cancel)
        .await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&batch)?
    } else {
        serde_json::to_string(&batch)?
    };
    println!("{}", output);

    Ok(())
}
