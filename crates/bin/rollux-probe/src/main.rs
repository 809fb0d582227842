//! Rollux Probe CLI
//!
//! Checks that a Rollux node exposes its peer ports, agrees with a reference
//! node on the latest block hash, and keeps advancing its chain head.
//!
//! ## Usage
//!
//! ```bash
//! # One-shot check, results are logged
//! rollux-probe https://my-node.example:8545
//!
//! # Same, with the full report as JSON on stdout
//! rollux-probe https://my-node.example:8545 --output json
//!
//! # Serve GET /api/check?rpc_url=... on 0.0.0.0:5000
//! rollux-probe --api-mode
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;

use rollux_probe_core::{
    MissingHashPolicy, NodeEndpoint, NullReporter, ProbeConfig, Prober, Reporter, TracingReporter,
    DEFAULT_REFERENCE_URL,
};

mod server;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rollux-probe")]
#[command(about = "Check Rollux node synchronization and progression")]
#[command(version)]
struct Cli {
    /// RPC URL of the Rollux node to test
    #[arg(required_unless_present = "api_mode")]
    rpc_url: Option<String>,

    /// Serve checks over HTTP instead of running once
    #[arg(long)]
    api_mode: bool,

    /// Trusted node to compare block hashes against
    #[arg(long, env = "ROLLUX_PROBE_REFERENCE_URL", default_value = DEFAULT_REFERENCE_URL)]
    reference_url: String,

    /// Seconds to wait for the chain head to advance
    #[arg(long, env = "ROLLUX_PROBE_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Seconds between chain head polls
    #[arg(
        long,
        env = "ROLLUX_PROBE_POLL_INTERVAL",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,

    /// TCP connect deadline per port (ms)
    #[arg(long, env = "ROLLUX_PROBE_PORT_TIMEOUT_MS", default_value_t = 1000)]
    port_timeout_ms: u64,

    /// Per-call RPC timeout in seconds (default: HTTP client default)
    #[arg(long, env = "ROLLUX_PROBE_RPC_TIMEOUT")]
    rpc_timeout: Option<u64>,

    /// Comma-separated ports to probe (default depends on mode)
    #[arg(long, env = "ROLLUX_PROBE_PORTS", value_delimiter = ',')]
    ports: Option<Vec<u16>>,

    /// Verdict when neither node returns a block hash (fail, pass)
    #[arg(long, env = "ROLLUX_PROBE_MISSING_HASH", default_value = "fail")]
    missing_hash: MissingHashPolicy,

    /// Bind address in API mode
    #[arg(short, long, env = "ROLLUX_PROBE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Listen port in API mode
    #[arg(short, long, env = "ROLLUX_PROBE_PORT", default_value_t = 5000)]
    port: u16,

    /// Output format for one-shot mode
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Apply flags on top of the defaults for the selected mode
    fn probe_config(&self) -> Result<ProbeConfig> {
        let mut config = if self.api_mode {
            ProbeConfig::service_defaults()
        } else {
            ProbeConfig::cli_defaults()
        };

        config.reference = NodeEndpoint::parse(&self.reference_url)?;
        config.timeout = Duration::from_secs(self.timeout);
        config.poll_interval = Duration::from_secs(self.poll_interval);
        config.port_timeout = Duration::from_millis(self.port_timeout_ms);
        config.rpc_timeout = self.rpc_timeout.map(Duration::from_secs);
        config.missing_hash = self.missing_hash;
        if let Some(ports) = &self.ports {
            config.ports = ports.clone();
        }

        Ok(config)
    }

    /// Per-check narrative for one-shot runs. The service answers with JSON
    /// and keeps its log to the request trace.
    fn reporter(&self) -> Arc<dyn Reporter> {
        if self.api_mode {
            Arc::new(NullReporter)
        } else {
            Arc::new(TracingReporter)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rollux_probe={level},rollux_probe_core={level},tower_http={level}").into()
            }),
        )
        .init();

    let config = cli.probe_config()?;

    if cli.api_mode {
        let prober = Prober::http(&config, cli.reporter())?;
        return server::serve(&cli.bind, cli.port, prober, config).await;
    }

    match &cli.rpc_url {
        Some(rpc_url) => run_check(rpc_url, config, cli.reporter(), cli.output).await,
        None => anyhow::bail!("rpc_url is required unless --api-mode is set"),
    }
}

async fn run_check(
    rpc_url: &str,
    config: ProbeConfig,
    reporter: Arc<dyn Reporter>,
    output: OutputFormat,
) -> Result<()> {
    info!("Starting checks against {}", rpc_url);

    let target = NodeEndpoint::parse(rpc_url)?;
    let prober = Prober::http(&config, reporter)?;
    let report = prober.run_checks(&target, &config).await;

    if output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
