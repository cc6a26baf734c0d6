//! `cohash` — inspect consistent hash ring placement.
//!
//! Builds a ring from a config file and/or flags, then answers lookups or
//! reports how keys spread over the members.
//!
//! # Usage
//!
//! ```text
//! cohash -n server1 -n server2 -n server3 get A B C   # owner per key
//! cohash -c cohash.toml get-n user:42 --count 2      # ordered replicas
//! cohash -c cohash.toml distribution --keys 10000    # load per member
//! cohash -c cohash.toml distribution --remove server3
//! cohash -c cohash.toml dump                         # every vnode
//! ```

mod config;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cohash_ring::{ConsistentHash, Distribution, HashAlgorithm, remaps};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "cohash",
    version,
    about = "Consistent hash ring placement inspector"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "COHASH_CONFIG")]
    config: Option<PathBuf>,

    /// Member address to add to the ring. Repeat for several members.
    ///
    /// Replaces the `[ring] nodes` list from the config file.
    #[arg(short = 'n', long = "node", global = true)]
    nodes: Vec<String>,

    /// Vnodes per member (default 200).
    #[arg(long, global = true)]
    vnodes: Option<usize>,

    /// Hash primitive: `blake3` or `xxh3`.
    #[arg(long, global = true)]
    hash: Option<HashAlgorithm>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the member owning each key.
    Get {
        /// Keys to look up.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print the nearest distinct members for a key, nearest first.
    GetN {
        /// Key to look up.
        key: String,

        /// Number of distinct members.
        #[arg(long, default_value = "2")]
        count: usize,
    },

    /// Show how random keys spread across the members.
    Distribution {
        /// Number of random keys to place.
        #[arg(short, long, default_value = "10000")]
        keys: usize,

        /// Seed for the key generator.
        #[arg(short, long, default_value = "1")]
        seed: u64,

        /// Also remove this member and report how many keys moved.
        #[arg(short, long)]
        remove: Option<String>,
    },

    /// Print every vnode in token order.
    Dump,
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    config.apply_overrides(cli.vnodes, cli.hash, cli.nodes);
    let ring = build_ring(&config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Get { keys } => cmd_get(&ring, &keys, &mut out),
        Commands::GetN { key, count } => cmd_get_n(&ring, &key, count, &mut out),
        Commands::Distribution { keys, seed, remove } => {
            cmd_distribution(&ring, keys, seed, remove.as_deref(), &mut out)
        }
        Commands::Dump => cmd_dump(&ring, &mut out),
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output stays clean on stdout.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build the ring described by `config`.
fn build_ring(config: &CliConfig) -> Result<ConsistentHash<HashAlgorithm>> {
    let ring = ConsistentHash::with_hasher(config.ring.hash);
    ring.set_vnode_count(config.vnode_count())
        .context("invalid [ring] vnode_count")?;
    for node in &config.ring.nodes {
        if !ring.add(node) {
            debug!(node = %node, "duplicate node ignored");
        }
    }
    info!(
        members = ring.member_count(),
        vnodes = ring.vnode_count(),
        hash = %config.ring.hash,
        "ring ready"
    );
    Ok(ring)
}

// -----------------------------------------------------------------------
// Lookups
// -----------------------------------------------------------------------

fn cmd_get(
    ring: &ConsistentHash<HashAlgorithm>,
    keys: &[String],
    out: &mut impl Write,
) -> Result<()> {
    for key in keys {
        let server = ring
            .get(key.as_bytes())
            .context("add members with --node or [ring] nodes")?;
        writeln!(out, "key={key} server={server}")?;
    }
    Ok(())
}

fn cmd_get_n(
    ring: &ConsistentHash<HashAlgorithm>,
    key: &str,
    count: usize,
    out: &mut impl Write,
) -> Result<()> {
    let servers = ring
        .get_n(key.as_bytes(), count)
        .with_context(|| format!("cannot pick {count} members for {key:?}"))?;
    for (rank, server) in servers.iter().enumerate() {
        writeln!(out, "{rank} {server}")?;
    }
    Ok(())
}

fn cmd_dump(ring: &ConsistentHash<HashAlgorithm>, out: &mut impl Write) -> Result<()> {
    for vn in ring.snapshot().vnodes() {
        writeln!(out, "{vn}")?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// Distribution
// -----------------------------------------------------------------------

fn cmd_distribution(
    ring: &ConsistentHash<HashAlgorithm>,
    key_count: usize,
    seed: u64,
    remove: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    anyhow::ensure!(!ring.is_empty(), "add members with --node or [ring] nodes");
    let keys = random_keys(seed, key_count);

    let before = ring.snapshot();
    writeln!(
        out,
        "{} keys across {} members ({} vnodes each)",
        keys.len(),
        before.member_count(),
        before.vnode_count()
    )?;
    write_distribution(&Distribution::measure(&before, &keys), out)?;

    let Some(removed) = remove else {
        return Ok(());
    };
    anyhow::ensure!(before.contains(removed), "{removed:?} is not a member");

    ring.remove(removed);
    let after = ring.snapshot();
    writeln!(out, "after removing {removed}")?;
    write_distribution(&Distribution::measure(&after, &keys), out)?;

    let moved = remaps(&before, &after, &keys);
    writeln!(out, "remapped {} of {} keys", moved.len(), keys.len())?;
    Ok(())
}

fn write_distribution(dist: &Distribution, out: &mut impl Write) -> Result<()> {
    for (member, count) in &dist.counts {
        writeln!(out, "  {member} {count}")?;
    }
    writeln!(out, "  std_dev {:.2}", dist.std_dev())?;
    Ok(())
}

/// `count` random 10-byte keys from a seeded generator.
fn random_keys(seed: u64, count: usize) -> Vec<[u8; 10]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut key = [0u8; 10];
            rng.fill_bytes(&mut key);
            key
        })
        .collect()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
