use crate::error::RotationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique player name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Fixed skill attributes, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub forehand: f32,
    pub backhand: f32,
    pub net_play: f32,
    pub consistency: f32,
    pub speed: f32,
    pub serve: f32,
}

impl PlayerProfile {
    /// Build a profile, rejecting attributes outside `[0, 1]`.
    pub fn new(
        forehand: f32,
        backhand: f32,
        net_play: f32,
        consistency: f32,
        speed: f32,
        serve: f32,
    ) -> Result<Self, RotationError> {
        let profile = Self {
            forehand,
            backhand,
            net_play,
            consistency,
            speed,
            serve,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// A profile with every attribute set to `value`.
    pub fn uniform(value: f32) -> Self {
        Self {
            forehand: value,
            backhand: value,
            net_play: value,
            consistency: value,
            speed: value,
            serve: value,
        }
    }

    pub fn validate(&self) -> Result<(), RotationError> {
        let attributes = [
            ("forehand", self.forehand),
            ("backhand", self.backhand),
            ("net_play", self.net_play),
            ("consistency", self.consistency),
            ("speed", self.speed),
            ("serve", self.serve),
        ];
        for (name, value) in attributes {
            if !(0.0..=1.0).contains(&value) {
                return Err(RotationError::InvalidConfiguration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    #[serde(default)]
    pub profile: PlayerProfile,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, profile: PlayerProfile) -> Self {
        Self {
            id: PlayerId::new(id),
            profile,
        }
    }
}

/// Exactly three players with distinct names and valid profiles.
///
/// The first two entries start on court, the third on the bench.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RosterEntry>", into = "Vec<RosterEntry>")]
pub struct Roster {
    entries: [RosterEntry; 3],
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, RotationError> {
        let entries: [RosterEntry; 3] = entries.try_into().map_err(|v: Vec<RosterEntry>| {
            RotationError::InvalidConfiguration(format!(
                "exactly three players are required, got {}",
                v.len()
            ))
        })?;

        for (i, entry) in entries.iter().enumerate() {
            entry.profile.validate()?;
            if entries[..i].iter().any(|other| other.id == entry.id) {
                return Err(RotationError::InvalidConfiguration(format!(
                    "duplicate player name {}",
                    entry.id
                )));
            }
        }

        Ok(Self { entries })
    }

    pub fn ids(&self) -> [PlayerId; 3] {
        [
            self.entries[0].id.clone(),
            self.entries[1].id.clone(),
            self.entries[2].id.clone(),
        ]
    }

    pub fn entries(&self) -> &[RosterEntry; 3] {
        &self.entries
    }

    pub fn profile(&self, id: &PlayerId) -> Option<&PlayerProfile> {
        self.entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| &entry.profile)
    }

    pub fn competitor(&self, id: &PlayerId) -> Option<Competitor> {
        self.profile(id).map(|profile| Competitor {
            id: id.clone(),
            profile: *profile,
        })
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            entries: [
                RosterEntry::new(
                    "Player 1",
                    PlayerProfile {
                        forehand: 0.75,
                        backhand: 0.6,
                        net_play: 0.5,
                        consistency: 0.7,
                        speed: 0.65,
                        serve: 0.7,
                    },
                ),
                RosterEntry::new(
                    "Player 2",
                    PlayerProfile {
                        forehand: 0.6,
                        backhand: 0.7,
                        net_play: 0.7,
                        consistency: 0.6,
                        speed: 0.7,
                        serve: 0.55,
                    },
                ),
                RosterEntry::new(
                    "Player 3",
                    PlayerProfile {
                        forehand: 0.65,
                        backhand: 0.65,
                        net_play: 0.4,
                        consistency: 0.8,
                        speed: 0.6,
                        serve: 0.6,
                    },
                ),
            ],
        }
    }
}

impl TryFrom<Vec<RosterEntry>> for Roster {
    type Error = RotationError;

    fn try_from(entries: Vec<RosterEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Roster> for Vec<RosterEntry> {
    fn from(roster: Roster) -> Self {
        roster.entries.into()
    }
}

/// A player taking part in a match.
#[derive(Clone, Debug, PartialEq)]
pub struct Competitor {
    pub id: PlayerId,
    pub profile: PlayerProfile,
}

/// Half of the court a player defends for the duration of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Near,
    Far,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Near => Side::Far,
            Side::Far => Side::Near,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Near => 0,
            Side::Far => 1,
        }
    }
}

/// Position in court units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CourtPoint {
    pub x: f32,
    pub y: f32,
}

impl CourtPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: CourtPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub current_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_requires_three_players() {
        let entries = vec![
            RosterEntry::new("A", PlayerProfile::default()),
            RosterEntry::new("B", PlayerProfile::default()),
        ];
        assert!(matches!(
            Roster::new(entries),
            Err(RotationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_roster_rejects_duplicate_names() {
        let entries = vec![
            RosterEntry::new("A", PlayerProfile::default()),
            RosterEntry::new("B", PlayerProfile::default()),
            RosterEntry::new("A", PlayerProfile::default()),
        ];
        assert!(Roster::new(entries).is_err());
    }

    #[test]
    fn test_profile_rejects_out_of_range_attribute() {
        assert!(PlayerProfile::new(0.5, 0.5, 1.2, 0.5, 0.5, 0.5).is_err());
        assert!(PlayerProfile::new(0.0, 1.0, 0.5, 0.5, 0.5, 0.5).is_ok());
        assert!(PlayerProfile::uniform(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_roster_deserializes_from_list() {
        let json = r#"[
            {"id": "Ann", "profile": {"forehand": 0.9, "backhand": 0.4, "net_play": 0.3,
                                      "consistency": 0.6, "speed": 0.5, "serve": 0.8}},
            {"id": "Bo"},
            {"id": "Cy"}
        ]"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.ids()[0], PlayerId::from("Ann"));
        assert_eq!(roster.profile(&"Bo".into()), Some(&PlayerProfile::default()));
    }

    #[test]
    fn test_side_opposite_round_trips() {
        assert_eq!(Side::Near.opposite(), Side::Far);
        assert_eq!(Side::Far.opposite().index(), 1);
    }
}
