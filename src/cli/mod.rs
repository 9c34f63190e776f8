//! `octo-acp` command line: replays a recorded agent trace through the
//! bridge and prints the resulting ACP notifications on stdout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::acp::{Client, DebugLogClient, EventSubscriber, NdjsonClient, ThreadBridge};
use crate::agent::{Event, StreamChunk};
use crate::core::config::{load_config, BridgeConfig};
use crate::core::error::AcpError;
use crate::core::stats::{SharedStats, TokenUsage};

#[derive(Parser, Debug)]
#[command(name = "octo-acp", version, about = "Agent event to ACP notification bridge")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSONL agent trace as ACP session updates
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Trace file (reads stdin when omitted)
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Session ID to stamp on notifications
    #[arg(long, env = "OCTO_ACP_SESSION_ID")]
    pub session: Option<String>,

    /// Treat the trace as non-streaming (emit complete assistant messages)
    #[arg(long)]
    pub no_streaming: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Working directory
    #[arg(short = 'c', long = "cwd")]
    pub working_dir: Option<PathBuf>,
}

/// One line of a recorded trace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceItem {
    Event {
        event: Event,
    },
    Token {
        chunk: StreamChunk,
    },
    Usage {
        usage: TokenUsage,
        #[serde(default)]
        cost: f64,
    },
    NewTurn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub tokens: usize,
    pub turns: usize,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => replay(args).await,
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    // stdout carries protocol traffic.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn apply_args(config: &mut BridgeConfig, args: &ReplayArgs) {
    if args.no_streaming {
        config.streaming_enabled = false;
    }
    if args.debug {
        config.debug = true;
    }
}

async fn replay(args: ReplayArgs) -> Result<()> {
    let mut config =
        load_config(args.working_dir.clone()).map_err(|e| anyhow::anyhow!("{e}"))?;
    apply_args(&mut config, &args);
    init_tracing(config.debug);

    let session_id = args
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let client: Arc<dyn Client> = if config.debug_log {
        Arc::new(DebugLogClient::new(
            NdjsonClient::stdout(),
            &config.resolved_debug_log_dir(),
        ))
    } else {
        Arc::new(NdjsonClient::stdout())
    };
    let (bridge, worker) = ThreadBridge::spawn(
        client,
        config.channel_capacity,
        &tokio::runtime::Handle::current(),
    );

    let stats = SharedStats::new();
    let subscriber = EventSubscriber::from_config(session_id.clone(), Arc::new(bridge), &config)
        .with_stats(Arc::new(stats.clone()));

    tracing::debug!(session_id = %session_id, streaming = config.streaming_enabled, "Starting replay");

    // The agent side runs on its own thread, like the real runtime.
    let trace = args.trace.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<ReplaySummary> {
        let items = read_trace(trace.as_deref())?;
        Ok(replay_items(&subscriber, &stats, items)?)
    })
    .await
    .context("Replay worker panicked")?;

    // Subscriber is gone, so the consumer drains what is left and exits.
    worker.await.context("Notification worker panicked")?;

    let summary = outcome?;
    tracing::debug!(
        events = summary.events,
        tokens = summary.tokens,
        turns = summary.turns,
        "Replay finished"
    );
    Ok(())
}

pub fn read_trace(path: Option<&Path>) -> Result<Vec<TraceItem>> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open trace {}", path.display()))?;
            parse_trace(std::io::BufReader::new(file))
        }
        None => parse_trace(std::io::stdin().lock()),
    }
}

pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceItem>> {
    let mut items = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read trace")?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line)
            .with_context(|| format!("Invalid trace item on line {}", i + 1))?;
        items.push(item);
    }
    Ok(items)
}

/// Feeds trace items to the subscriber in order. Stops at the first
/// token-path error; discrete events never fail.
pub fn replay_items(
    subscriber: &EventSubscriber,
    stats: &SharedStats,
    items: Vec<TraceItem>,
) -> Result<ReplaySummary, AcpError> {
    let mut summary = ReplaySummary {
        turns: 1,
        ..Default::default()
    };
    for item in items {
        match item {
            TraceItem::Event { event } => {
                subscriber.handle(&event);
                summary.events += 1;
            }
            TraceItem::Token { chunk } => {
                subscriber.on_token(&chunk)?;
                summary.tokens += 1;
            }
            TraceItem::Usage { usage, cost } => stats.record(&usage, cost),
            TraceItem::NewTurn => {
                subscriber.reset_turn();
                summary.turns += 1;
            }
        }
    }
    Ok(summary)
}
