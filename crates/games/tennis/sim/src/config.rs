use crate::court::Court;
use crate::shots::ShotCatalog;
use serde::Deserialize;

/// Probability model coefficients.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Ace probability is `serve * ace_coefficient`.
    pub ace_coefficient: f32,
    /// Exchanges before a rally is cut short and decided at random.
    pub rally_cap: u32,

    // Clean winner
    /// Scales `(category_skill - 0.5)` into the winner bonus.
    pub skill_weight: f32,
    /// Scales `(momentum - 0.5)` into the winner bonus.
    pub momentum_weight: f32,
    pub fatigue_winner_penalty: f32,

    // Opponent unforced error
    pub base_error: f32,
    pub inconsistency_error: f32,
    pub fatigue_error: f32,

    // Failed retrieval, in court units
    pub reach_base: f32,
    pub reach_per_speed: f32,
    pub reach_fatigue_loss: f32,
    pub passed_chance: f32,

    /// Fatigue added to both players per shot of a finished point.
    pub fatigue_per_shot: f32,

    // Shot selection
    pub response_chance: f32,
    pub net_skill_floor: f32,
    pub net_base_chance: f32,
    pub net_skill_chance: f32,
    pub approach_chance: f32,
    pub cross_court_chance: f32,
    /// Side-relative depth below which a player counts as at the net.
    pub net_zone: f32,
    /// Upper bound of the mid-court band that starts at `net_zone`.
    pub mid_zone: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ace_coefficient: 0.08,
            rally_cap: 50,

            skill_weight: 0.3,
            momentum_weight: 0.15,
            fatigue_winner_penalty: 0.05,

            base_error: 0.04,
            inconsistency_error: 0.06,
            fatigue_error: 0.08,

            reach_base: 50.0,
            reach_per_speed: 40.0,
            reach_fatigue_loss: 20.0,
            passed_chance: 0.3,

            fatigue_per_shot: 0.01,

            response_chance: 0.5,
            net_skill_floor: 0.4,
            net_base_chance: 0.4,
            net_skill_chance: 0.3,
            approach_chance: 0.2,
            cross_court_chance: 0.5,
            net_zone: 0.35,
            mid_zone: 0.7,
        }
    }
}

/// Everything a [`TennisSimulator`](crate::TennisSimulator) needs.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TennisConfig {
    pub sim: SimConfig,
    pub court: Court,
    pub shots: ShotCatalog,
}
