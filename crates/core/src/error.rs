use crate::types::PlayerId;
use thiserror::Error;

/// Errors raised by the rotation core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// Session parameters that can never produce a valid rotation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A match result named a winner who is not on court.
    #[error("{winner} is not currently on court")]
    InvalidParticipant { winner: PlayerId },
}
