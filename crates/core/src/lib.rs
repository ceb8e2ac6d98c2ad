pub mod dynamics;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod pacing;
pub mod sink;
pub mod types;

pub use dynamics::{DynamicsConfig, DynamicsTable, PlayerDynamics};
pub use engine::{MatchOutcome, MatchPair, PointEnding, PointEngine, PointOutcome};
pub use error::RotationError;
pub use ledger::{Arrangement, MatchSnapshot, RotationLedger};
pub use pacing::{Beat, PacingConfig, SpeedMultiplier};
pub use sink::{NullSink, PresentationSink, SessionEvent};
pub use types::{
    Competitor, CourtPoint, PlayerId, PlayerProfile, PlayerStats, Roster, RosterEntry, Side,
};
