use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use stockpick_agents::claude_cli::check_cli_available;
use stockpick_models::DedupMode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DedupArg {
    Snapshot,
    Claim,
}

impl From<DedupArg> for DedupMode {
    fn from(arg: DedupArg) -> Self {
        match arg {
            DedupArg::Snapshot => DedupMode::Snapshot,
            DedupArg::Claim => DedupMode::Claim,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "stockpick",
    about = "Run parallel pick agents and print a deduplicated set of tickers"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/stockpick.toml")]
    config: String,

    /// Number of pick agents (overrides config)
    #[arg(short, long)]
    agents: Option<usize>,

    /// Attempts per agent (overrides config)
    #[arg(short, long)]
    max_attempts: Option<u32>,

    /// How agents learn which tickers are taken (overrides config)
    #[arg(long, value_enum)]
    dedup_mode: Option<DedupArg>,

    /// Cancel unfinished agents after this many seconds (overrides config)
    #[arg(long)]
    deadline: Option<u64>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = stockpick::load_config(&cli.config)?;
    if let Some(agents) = cli.agents {
        config.picker.agent_count = agents;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.picker.max_attempts_per_agent = max_attempts;
    }
    if let Some(mode) = cli.dedup_mode {
        config.picker.dedup_mode = mode.into();
    }
    if let Some(deadline) = cli.deadline {
        config.picker.run_deadline_seconds = Some(deadline);
    }

    // Startup checks happen before any agent is dispatched
    let coordinator =
        stockpick::build_coordinator(&config).context("Failed to build coordinator")?;
    if !check_cli_available().await {
        bail!("claude CLI not found on PATH");
    }

    let result = coordinator.run().await;
    if result.is_short() {
        tracing::warn!(
            accepted = result.picks.len(),
            requested = result.requested_agents,
            "Fewer picks than agents"
        );
    }

    // Output run result as JSON to stdout
    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    Ok(())
}
