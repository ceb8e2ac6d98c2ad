use rally_core::{DynamicsConfig, Roster, RotationError};
use serde::Deserialize;

/// Everything needed to start a session, apart from the engine's own config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub roster: Roster,
    /// Consecutive wins before the winner is sent to the bench.
    pub max_streak: u32,
    /// First to this many points takes the match.
    pub points_to_win: u32,
    pub seed: u64,
    pub dynamics: DynamicsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            roster: Roster::default(),
            max_streak: 3,
            points_to_win: 3,
            seed: 0,
            dynamics: DynamicsConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), RotationError> {
        if self.max_streak < 1 {
            return Err(RotationError::InvalidConfiguration(
                "max_streak must be at least 1".into(),
            ));
        }
        if self.points_to_win < 1 {
            return Err(RotationError::InvalidConfiguration(
                "points_to_win must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"seed": 9, "points_to_win": 5}"#).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.points_to_win, 5);
        assert_eq!(config.max_streak, 3);
        assert_eq!(config.roster, Roster::default());
    }

    #[test]
    fn test_roster_from_json_is_validated() {
        let json = r#"{"roster": [{"id": "A"}, {"id": "A"}, {"id": "C"}]}"#;
        assert!(serde_json::from_str::<SessionConfig>(json).is_err());

        let json = r#"{"roster": [{"id": "A"}, {"id": "B"}, {"id": "C"}]}"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.roster.ids()[2].as_str(), "C");
    }

    #[test]
    fn test_zero_targets_are_rejected() {
        let config = SessionConfig {
            points_to_win: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
        let config = SessionConfig {
            max_streak: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
