//! Transport contract towards the external game server.

use thiserror::Error;

use crate::{GameCommand, GameInfo, GameState, Position};

/// Request/response interface of the game server.
///
/// Every method performs exactly one blocking exchange. Implementations are
/// owned by a single environment instance and are never shared between
/// instances.
pub trait GameServer {
    /// Fetches the static game configuration (`GET info`).
    fn info(&mut self) -> Result<GameInfo, ServerError>;

    /// Starts a fresh game and returns its first snapshot (`POST reset`).
    fn reset(&mut self) -> Result<GameState, ServerError>;

    /// Submits a command and returns the resulting snapshot (`POST step`).
    fn step(&mut self, command: &GameCommand) -> Result<GameState, ServerError>;

    /// Fetches an encoded image of the current frame (`GET render`).
    fn render(&mut self) -> Result<Vec<u8>, ServerError>;

    /// Overrides the path geometry used by subsequent resets (`POST set-map`).
    fn set_map(&mut self, waypoints: &[Position]) -> Result<(), ServerError>;
}

/// Failures reported while talking to the game server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server answered with a non-success status.
    #[error("server rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the server.
        status: u16,
        /// Human-readable reason supplied by the server.
        message: String,
    },
    /// The request could not be delivered or the reply could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The reply body did not match the expected schema.
    #[error("malformed server reply: {0}")]
    Decode(String),
}

impl ServerError {
    /// Reports whether the server understood and refused the request.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
