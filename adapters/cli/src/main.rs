#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the tower-defense environment against a live server.

mod config;
mod replay;
mod rollout;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_gym_core::Environment;
use tower_gym_http::HttpGameServer;
use tower_gym_rendering::{FrameSink, ImageDecoder};
use tower_gym_world::TowerDefenseEnv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::CliConfig, replay::ReplayFile};

#[derive(Parser, Debug)]
#[command(
    name = "tower-gym",
    about = "Reinforcement-learning adapter for the tower-defense server"
)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the server base URL from the configuration.
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the grid, capacity bounds and space sizes derived from the server.
    Inspect,
    /// Plays episodes with a uniformly random mask-respecting policy.
    Rollout {
        /// Number of episodes to play.
        #[arg(long, default_value_t = 1)]
        episodes: usize,
        /// Seed of the policy and of the map rotation.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Step limit per episode.
        #[arg(long, default_value_t = 10_000)]
        max_steps: usize,
    },
    /// Replays a recorded actions file and renders every accepted action.
    Replay {
        /// JSON file holding `actions` and `wave_number`.
        #[arg(long)]
        actions_file: PathBuf,
        /// Saves frames into `best_frames/` next to the actions file.
        #[arg(long)]
        save_frames: bool,
    },
}

/// Entry point for the tower-gym command-line interface.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let mut config = CliConfig::load(args.config.as_deref())?;
    if let Some(url) = args.server_url {
        config.server.base_url = url;
    }

    let server = HttpGameServer::new(&config.server)
        .with_context(|| format!("failed to create client for {}", config.server.base_url))?;

    match args.command {
        Command::Inspect => run_inspect(server, &config),
        Command::Rollout {
            episodes,
            seed,
            max_steps,
        } => run_rollout(server, &config, episodes, seed, max_steps),
        Command::Replay {
            actions_file,
            save_frames,
        } => run_replay(server, actions_file, save_frames),
    }
}

fn run_inspect(server: HttpGameServer, config: &CliConfig) -> Result<()> {
    let env = TowerDefenseEnv::new(server, ImageDecoder, config.env_config())
        .context("failed to start the environment")?;
    let info = env.info();
    let bounds = env.bounds();

    let towers: Vec<&str> = info.towers.iter().map(|tower| tower.kind.as_str()).collect();

    println!(
        "grid: {} x {} cells of {}",
        info.grid_columns(),
        info.grid_rows(),
        info.map.cell_size
    );
    println!(
        "path: {} cells, length {}",
        info.map.path_cells.len(),
        info.map.path_length
    );
    println!("towers: {}", towers.join(", "));
    println!("enemy types: {}", info.waves.enemy_types.join(", "));
    println!("max towers: {}", bounds.max_towers());
    println!("max enemies: {}", bounds.max_enemies());
    println!("action space: {:?}", env.action_space().nvec());
    println!("observation length: {}", env.observation_space().len());
    Ok(())
}

fn run_rollout(
    server: HttpGameServer,
    config: &CliConfig,
    episodes: usize,
    seed: u64,
    max_steps: usize,
) -> Result<()> {
    let mut env_config = config.env_config();
    env_config.seed = seed;
    let mut env = TowerDefenseEnv::new(server, ImageDecoder, env_config)
        .context("failed to start the environment")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for episode in 0..episodes {
        let episode_seed = (episode == 0).then_some(seed);
        let summary = rollout::run_episode(&mut env, &mut rng, episode_seed, max_steps)
            .with_context(|| format!("episode {episode} failed"))?;
        info!(
            episode,
            steps = summary.steps,
            total_reward = summary.total_reward,
            wave = summary.final_wave,
            terminated = summary.terminated,
            truncated = summary.truncated,
            towers = ?summary.tower_counts,
            "rollout episode"
        );
    }
    Ok(())
}

fn run_replay(
    mut server: HttpGameServer,
    actions_file: PathBuf,
    save_frames: bool,
) -> Result<()> {
    let file = ReplayFile::load(&actions_file)?;
    let mut sink = if save_frames {
        let sink = FrameSink::create(replay::frames_dir(&actions_file))?;
        info!(directory = %sink.directory().display(), "saving frames");
        Some(sink)
    } else {
        None
    };

    let outcome = replay::replay(&mut server, &file, sink.as_mut())?;
    println!(
        "replayed {} actions ({} skipped), {} frames; recorded episode reached wave {}",
        outcome.accepted, outcome.skipped, outcome.frames, file.wave_number
    );
    Ok(())
}
