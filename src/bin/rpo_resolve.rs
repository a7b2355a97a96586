//! RPO Resolve CLI
//!
//! Resolves a list of company names (one per line) to ICO numbers and writes
//! one JSON outcome per input line, in input order.
//!
//! Usage:
//!   rpo-resolve --input firmy.txt --output firmy_s_ico.json
//!   cat firmy.txt | rpo-resolve --format jsonl > out.jsonl
//!
//! Tuning:
//!   rpo-resolve -i firmy.txt --config resolver.yaml --workers 4 --max-requests-per-minute 30
//!
//! Ctrl-C stops after the batch in flight; unprocessed names are reported as
//! cancelled. A second Ctrl-C exits immediately with status 130.

use std::fs::File;
use std::future::Future;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rpo_resolver::{
    BatchOrchestrator, ProgressTracker, ResolutionOutcome, ResolverConfig, RpoClient, RunSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

/// Resolve company names to ICO via the RPO register
#[derive(Parser, Debug)]
#[command(name = "rpo-resolve")]
#[command(about = "Resolve company names to ICO numbers via the RPO search API")]
struct Args {
    /// File with one company name per line (default: stdin)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// YAML config file; flags below override its values
    #[arg(long, short = 'c', env = "RPO_RESOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// RPO search endpoint
    #[arg(long, env = "RPO_BASE_URL")]
    base_url: Option<String>,

    /// Concurrent workers per batch
    #[arg(long, short = 'w', env = "RPO_MAX_WORKERS")]
    workers: Option<usize>,

    /// Ceiling on requests per 60-second window
    #[arg(long, env = "RPO_MAX_REQ_PER_MIN")]
    max_requests_per_minute: Option<u32>,

    /// Names per batch
    #[arg(long, short = 'b', env = "RPO_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "RPO_REQUEST_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// Attempts per query variant
    #[arg(long, env = "RPO_RETRY_COUNT")]
    retries: Option<u32>,

    /// Backoff unit in milliseconds (attempt k sleeps k * unit)
    #[arg(long, env = "RPO_RETRY_BACKOFF_MS")]
    backoff_ms: Option<u64>,

    /// Pause between batches in milliseconds
    #[arg(long, env = "RPO_BATCH_PAUSE_MS")]
    batch_pause_ms: Option<u64>,

    /// Include inactive (dissolved) entities in the search
    #[arg(long)]
    include_inactive: bool,

    /// Seconds between progress log lines (0 disables)
    #[arg(long, default_value_t = 10)]
    progress_interval_secs: u64,
}

fn build_config(args: &Args) -> Result<ResolverConfig> {
    let mut config = match &args.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    if let Some(rpm) = args.max_requests_per_minute {
        config.max_requests_per_minute = rpm;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        config.retry_count = retries;
    }
    if let Some(backoff) = args.backoff_ms {
        config.retry_backoff_base_ms = backoff;
    }
    if let Some(pause) = args.batch_pause_ms {
        config.batch_pause_ms = pause;
    }
    if args.include_inactive {
        config.only_active = false;
    }

    config.validate().context("Invalid resolver configuration")?;
    Ok(config)
}

fn read_names(input: Option<&Path>) -> Result<Vec<String>> {
    let mut content = String::new();
    match input {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?
                .read_to_string(&mut content)
                .with_context(|| format!("Failed to read {}", path.display()))?;
        }
        None => {
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read names from stdin")?;
        }
    }
    Ok(content.lines().map(str::to_string).collect())
}

fn write_outcomes(
    outcomes: &[ResolutionOutcome],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, outcomes)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for outcome in outcomes {
                serde_json::to_writer(&mut writer, outcome)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush().context("Failed to flush output")?;
    Ok(())
}

fn spawn_progress_reporter(
    progress: Arc<ProgressTracker>,
    every: Duration,
) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snap = progress.snapshot();
            if !snap.is_running {
                break;
            }
            info!(
                completed = snap.completed,
                total = snap.total,
                succeeded = snap.succeeded,
                failed = snap.failed,
                per_minute = %format!("{:.1}", snap.items_per_minute()),
                eta_secs = snap.eta().map(|d| d.as_secs()).unwrap_or(0),
                "Progress"
            );
        }
    }))
}

/// First interrupt requests a stop at the next batch boundary; a second one
/// returns `true` so the caller can abort.
async fn watch_interrupts<F, Fut>(progress: Arc<ProgressTracker>, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    warn!("Interrupt received, stopping after the current batch (Ctrl-C again to abort)");
    progress.request_stop();

    if next_signal().await.is_err() {
        return false;
    }
    error!("Second interrupt, aborting without writing output");
    true
}

fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpo_resolver=info,rpo_resolve=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let names = read_names(args.input.as_deref())?;

    info!(
        names = names.len(),
        base_url = %config.base_url,
        workers = config.max_workers,
        max_requests_per_minute = config.max_requests_per_minute,
        "Loaded input"
    );

    let search = Arc::new(RpoClient::from_config(&config)?);
    let orchestrator = BatchOrchestrator::from_config(&config, search);
    let progress = orchestrator.progress();

    let stop = Arc::clone(&progress);
    tokio::spawn(async move {
        if watch_interrupts(stop, tokio::signal::ctrl_c).await {
            std::process::exit(130);
        }
    });

    let reporter = spawn_progress_reporter(
        Arc::clone(&progress),
        Duration::from_secs(args.progress_interval_secs),
    );

    let outcomes = orchestrator.run(&names).await;
    if let Some(reporter) = reporter {
        reporter.abort();
    }

    write_outcomes(&outcomes, args.format, args.output.as_deref())?;

    let summary = RunSummary::from_outcomes(&outcomes);
    let snapshot = progress.snapshot();
    info!(
        found = summary.found,
        total = summary.total,
        without_identifier = summary.without_identifier,
        not_found = summary.not_found,
        exceptions = summary.exceptions,
        cancelled = summary.cancelled,
        checksum_failures = summary.checksum_failures,
        success_rate = %format!("{:.1}%", summary.success_rate()),
        runtime = %format_hms(snapshot.elapsed()),
        "Done"
    );

    Ok(())
}
