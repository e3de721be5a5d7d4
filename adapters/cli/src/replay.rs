use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tower_gym_core::{GameCommand, GameServer, Position, ServerError};
use tower_gym_rendering::{decode_frame, FrameSink};
use tracing::{info, warn};

/// Path installed before replaying recorded commands.
pub(crate) const DEFAULT_MAP_WAYPOINTS: [(f64, f64); 12] = [
    (75.0, 25.0),
    (75.0, 325.0),
    (225.0, 325.0),
    (225.0, 475.0),
    (375.0, 475.0),
    (375.0, 125.0),
    (825.0, 125.0),
    (825.0, 275.0),
    (525.0, 275.0),
    (525.0, 525.0),
    (725.0, 525.0),
    (725.0, 575.0),
];

/// Directory name, next to the actions file, that receives saved frames.
pub(crate) const FRAMES_DIR: &str = "best_frames";

/// Recorded episode: raw server commands plus the wave it reached.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct ReplayFile {
    pub(crate) actions: Vec<GameCommand>,
    #[serde(default)]
    pub(crate) wave_number: u32,
}

impl ReplayFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read actions file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse actions file {}", path.display()))
    }
}

/// Counters describing a finished replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReplayOutcome {
    pub(crate) accepted: usize,
    pub(crate) skipped: usize,
    pub(crate) frames: usize,
}

/// Directory that receives frames for the given actions file.
pub(crate) fn frames_dir(actions_file: &Path) -> PathBuf {
    actions_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(FRAMES_DIR)
}

/// Replays `file` on `server`, rendering after every accepted command.
///
/// Rejected commands are reported and skipped. A rejected render stops the
/// replay early; transport failures abort it.
pub(crate) fn replay<S: GameServer>(
    server: &mut S,
    file: &ReplayFile,
    mut sink: Option<&mut FrameSink>,
) -> Result<ReplayOutcome> {
    let waypoints: Vec<Position> = DEFAULT_MAP_WAYPOINTS
        .iter()
        .map(|&(x, y)| Position::new(x, y))
        .collect();
    server
        .set_map(&waypoints)
        .context("failed to install the default map")?;
    let _ = server.reset().context("failed to reset the game")?;

    let total = file.actions.len();
    let mut outcome = ReplayOutcome::default();
    for (index, command) in file.actions.iter().enumerate() {
        match server.step(command) {
            Ok(_) => outcome.accepted += 1,
            Err(ServerError::Rejected { message, .. }) => {
                warn!(action = index + 1, total, %message, "action rejected; continuing");
                outcome.skipped += 1;
                continue;
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("action {} of {total} failed", index + 1));
            }
        }

        let bytes = match server.render() {
            Ok(bytes) => bytes,
            Err(ServerError::Rejected { message, .. }) => {
                warn!(action = index + 1, %message, "render rejected; stopping");
                break;
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("render after action {} failed", index + 1));
            }
        };
        let frame = decode_frame(&bytes)?;
        outcome.frames += 1;
        if let Some(sink) = sink.as_deref_mut() {
            let _ = sink.write(&frame)?;
        }
    }

    info!(
        accepted = outcome.accepted,
        skipped = outcome.skipped,
        frames = outcome.frames,
        wave = file.wave_number,
        "replay finished"
    );
    Ok(outcome)
}
