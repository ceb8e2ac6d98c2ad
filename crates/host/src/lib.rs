mod config;
mod host;

pub use config::SessionConfig;
pub use host::{RunResult, SessionHost, StepOutcome};
