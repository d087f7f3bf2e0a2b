//! Headless runner for the cube swarm.
//!
//! Drives the first configured wave for a fixed number of ticks and reports
//! any breach of the separation rule.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rollcubes::{init_logging, GameConfig, SpawnDirector, Swarm};

/// Headless cube swarm simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON game configuration; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Overrides the RNG seed from the configuration
    #[arg(short, long)]
    seed: Option<u64>,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GameConfig::default()
            .validated()
            .context("validating built-in configuration")?,
    };
    if let Some(seed) = args.seed {
        config.settings.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    anyhow::ensure!(
        args.dt.is_finite() && args.dt > 0.0,
        "--dt must be a positive number of seconds, got {}",
        args.dt
    );
    let config = load_config(&args)?;
    let wave = config
        .waves
        .first()
        .cloned()
        .context("configuration defines no waves")?;

    let mut rng = SmallRng::seed_from_u64(config.settings.seed.wrapping_add(1));
    let mut swarm = Swarm::new(config.settings.clone());
    let mut director = SpawnDirector::new(wave, &config.enemies);

    let mut spawned = 0;
    let mut grazing_ticks = 0;
    let mut worst_breaches = 0;
    for tick in 0..args.ticks {
        spawned += director.update(&mut swarm, args.dt, &mut rng);
        swarm.tick(args.dt);
        for event in swarm.drain_events() {
            director.observe(&event);
        }
        if !swarm.separation_violations().is_empty() {
            grazing_ticks += 1;
        }
        let breaches = swarm.separation_breaches();
        if !breaches.is_empty() {
            warn!("tick {tick}: {} agent pairs breach separation", breaches.len());
            worst_breaches = worst_breaches.max(breaches.len());
        }
    }

    let isolated = swarm
        .agents()
        .filter(|(_, agent)| agent.neighbors().is_empty())
        .count();
    let health: f32 = swarm
        .agents()
        .map(|(_, agent)| agent.health().ratio())
        .sum();
    #[expect(clippy::cast_precision_loss, reason = "Agent counts are small.")]
    let mean_health = if swarm.is_empty() {
        1.0
    } else {
        health / swarm.len() as f32
    };
    info!(
        "simulated {} ticks: {spawned} spawned, {} live ({isolated} isolated, mean health {:.0}%), {} eliminated",
        args.ticks,
        swarm.len(),
        mean_health * 100.0,
        director.eliminated_count()
    );
    info!("{grazing_ticks} ticks with moving agents grazing, worst breach count {worst_breaches}");
    Ok(())
}
