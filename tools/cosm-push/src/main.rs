// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cosm datapoint CLI
//!
//! Fetch and delete feeds, and push datapoints read from stdin.
//!
//! # Usage
//!
//! ```bash
//! # Show a feed
//! cosm-push --api-key $KEY get --feed 7021
//!
//! # Push "<stream> <value> [rfc3339 timestamp]" lines
//! sensor-reader | cosm-push push --config cosm.yaml
//!
//! # Write an example configuration
//! cosm-push gen-config --output cosm.yaml
//! ```

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use cosm::config::DEFAULT_SERVER;
use cosm::{ClientConfig, CosmClient, Datastream, Publisher, PushConfig};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Cosm datapoint CLI
#[derive(Parser, Debug)]
#[command(name = "cosm-push")]
#[command(about = "Push datapoints to Cosm datastreams")]
#[command(version)]
struct Args {
    /// Service root (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// API key (overrides the config file)
    #[arg(long, env = "COSM_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a feed and print it as JSON
    Get {
        #[arg(short, long)]
        feed: u64,
    },

    /// Read "<stream> <value> [timestamp]" lines from stdin and publish them
    Push {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Delete a feed
    Delete {
        #[arg(short, long)]
        feed: u64,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "cosm.yaml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        Commands::Get { feed } => cmd_get(&args, *feed).await,
        Commands::Push { config } => cmd_push(&args, config).await,
        Commands::Delete { feed } => cmd_delete(&args, *feed).await,
        Commands::GenConfig { output } => cmd_gen_config(output),
        Commands::Validate { config } => cmd_validate(config),
    }
}

/// Client settings from flags alone, for commands without a config file.
fn client_from_args(args: &Args) -> anyhow::Result<CosmClient> {
    let api_key = args
        .api_key
        .clone()
        .ok_or_else(|| anyhow!("Missing --api-key (or set COSM_API_KEY)"))?;
    let server = args.server.as_deref().unwrap_or(DEFAULT_SERVER);
    let config = ClientConfig::new(api_key).with_server(server);
    config.validate()?;
    Ok(CosmClient::from_config(&config)?)
}

async fn cmd_get(args: &Args, feed_id: u64) -> anyhow::Result<()> {
    let client = client_from_args(args)?;
    let feed = client
        .get_feed(feed_id)
        .await
        .with_context(|| format!("fetching feed {}", feed_id))?;
    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}

async fn cmd_delete(args: &Args, feed_id: u64) -> anyhow::Result<()> {
    let client = client_from_args(args)?;
    let status = client
        .delete_feed_by_id(feed_id)
        .await
        .with_context(|| format!("deleting feed {}", feed_id))?;
    println!("Deleted feed {} (HTTP {})", feed_id, status);
    Ok(())
}

async fn cmd_push(args: &Args, config_path: &Path) -> anyhow::Result<()> {
    let mut config = PushConfig::from_file(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(ref key) = args.api_key {
        config.cosm.api_key = key.clone();
    }
    if let Some(ref server) = args.server {
        config.cosm.server = server.clone();
    }
    config.validate()?;

    let client = CosmClient::from_config(&config.cosm)?;
    let mut streams = Vec::with_capacity(config.streams.len());
    for stream in &config.streams {
        let datastream = Datastream::builder(stream.stream_id.clone())
            .feed_id(stream.feed_id)
            .publisher(client.clone())
            .queue_size(stream.queue_size)
            .build()?;
        streams.push(datastream);
    }
    tracing::info!(
        "Pushing to {} datastream(s) on {}",
        streams.len(),
        client.server()
    );

    let stats = push_lines(BufReader::new(tokio::io::stdin()), &mut streams).await;

    println!("--- Push Summary ---");
    for stream in &streams {
        println!(
            "  {}: {} points, {} batches published, {} batches failed",
            stream.address(),
            stream.points_accepted(),
            stream.batches_published(),
            stream.batches_failed()
        );
    }
    if stats.rejected > 0 {
        println!("  {} input line(s) rejected", stats.rejected);
    }
    match stats.read_error {
        Some(e) => Err(anyhow::Error::new(e)
            .context(format!("reading stdin after line {}", stats.lines))),
        None => Ok(()),
    }
}

/// Counters for one run of [`push_lines`].
#[derive(Debug, Default)]
struct PushStats {
    lines: usize,
    rejected: usize,
    /// Read failure that ended the input early.
    read_error: Option<std::io::Error>,
}

/// Route every input line to its stream, then flush all partial batches.
///
/// Lines that are not UTF-8 or do not parse are rejected one by one. A read
/// error stops the input but the flush still runs.
async fn push_lines<R, P>(mut reader: R, streams: &mut [Datastream<P>]) -> PushStats
where
    R: AsyncBufRead + Unpin,
    P: Publisher,
{
    let mut stats = PushStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("stdin read failed after line {}: {}", stats.lines, e);
                stats.read_error = Some(e);
                break;
            }
        }
        stats.lines += 1;
        let line_no = stats.lines;

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!("line {}: not valid UTF-8", line_no);
            stats.rejected += 1;
            continue;
        };
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let parsed = match parse_line(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("line {}: {}", line_no, e);
                stats.rejected += 1;
                continue;
            }
        };
        let Some(index) = resolve_stream(streams, parsed.stream) else {
            tracing::warn!("line {}: no configured stream '{}'", line_no, parsed.stream);
            stats.rejected += 1;
            continue;
        };
        if let Err(e) = streams[index].add_point(parsed.value, parsed.at).await {
            tracing::warn!("{}: publish failed: {}", streams[index].address(), e);
        }
    }

    for stream in streams.iter_mut() {
        if let Err(e) = stream.flush().await {
            tracing::warn!("{}: final flush failed: {}", stream.address(), e);
        }
    }
    stats
}

fn cmd_gen_config(output: &Path) -> anyhow::Result<()> {
    let yaml = PushConfig::example().to_yaml()?;
    let content = format!(
        "# Cosm push configuration\n# Generated by cosm-push gen-config\n\n{}",
        yaml
    );
    std::fs::write(output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(config_path: &Path) -> anyhow::Result<()> {
    let config = PushConfig::from_file(config_path)
        .with_context(|| format!("Configuration invalid: {}", config_path.display()))?;
    println!("Configuration valid!");
    println!();
    println!("Server: {}", config.cosm.server);
    println!("Streams: {}", config.streams.len());
    for (i, stream) in config.streams.iter().enumerate() {
        println!(
            "  [{}] feed {} / stream {} (queue size {})",
            i, stream.feed_id, stream.stream_id, stream.queue_size
        );
    }
    Ok(())
}

/// One parsed input line.
#[derive(Debug, PartialEq)]
struct InputLine<'a> {
    stream: &'a str,
    value: &'a str,
    at: Option<DateTime<Utc>>,
}

/// Parse `<stream> <value> [rfc3339 timestamp]`.
fn parse_line(line: &str) -> anyhow::Result<InputLine<'_>> {
    let mut parts = line.split_whitespace();
    let stream = parts.next().ok_or_else(|| anyhow!("empty line"))?;
    let value = parts
        .next()
        .ok_or_else(|| anyhow!("missing value for stream '{}'", stream))?;
    let at = match parts.next() {
        Some(ts) => Some(
            DateTime::parse_from_rfc3339(ts)
                .with_context(|| format!("invalid timestamp '{}'", ts))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    if parts.next().is_some() {
        bail!("unexpected trailing fields");
    }
    Ok(InputLine { stream, value, at })
}

/// Find a stream by `feed/stream` or, when unambiguous, by stream id alone.
fn resolve_stream<P>(streams: &[Datastream<P>], key: &str) -> Option<usize> {
    if let Some((feed, id)) = key.split_once('/') {
        let feed: u64 = feed.parse().ok()?;
        return streams
            .iter()
            .position(|s| s.feed_id() == feed && s.id() == id);
    }
    let mut matches = streams
        .iter()
        .enumerate()
        .filter(|(_, s)| s.id() == key)
        .map(|(i, _)| i);
    let first = matches.next()?;
    match matches.next() {
        Some(_) => None,
        None => Some(first),
    }
}
