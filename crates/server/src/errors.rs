use rally_core::RotationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServerError {
    #[error(transparent)]
    Rotation(#[from] RotationError),
    /// Zero, negative or non-finite playback speed.
    #[error("speed multiplier must be positive and finite, got {0}")]
    InvalidSpeed(f32),
}
