use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Momentum and fatigue steps applied by the orchestration layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub initial_momentum: f32,
    /// Added to the point winner's momentum.
    pub momentum_win_step: f32,
    /// Subtracted from the point loser's momentum.
    pub momentum_loss_step: f32,
    /// Fatigue shed by the bench player for every point played without them.
    pub bench_recovery_per_point: f32,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            initial_momentum: 0.5,
            momentum_win_step: 0.1,
            momentum_loss_step: 0.05,
            bench_recovery_per_point: 0.02,
        }
    }
}

/// Transient form of one player. Both values stay in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerDynamics {
    momentum: f32,
    fatigue: f32,
}

impl PlayerDynamics {
    pub fn new(momentum: f32, fatigue: f32) -> Self {
        Self {
            momentum: clamp_unit(momentum),
            fatigue: clamp_unit(fatigue),
        }
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn fatigue(&self) -> f32 {
        self.fatigue
    }
}

/// Per-player momentum and fatigue for a whole session.
#[derive(Clone, Debug, Default)]
pub struct DynamicsTable {
    players: BTreeMap<PlayerId, PlayerDynamics>,
}

impl DynamicsTable {
    pub fn new<'a>(players: impl IntoIterator<Item = &'a PlayerId>, config: &DynamicsConfig) -> Self {
        let fresh = PlayerDynamics::new(config.initial_momentum, 0.0);
        Self {
            players: players.into_iter().map(|p| (p.clone(), fresh)).collect(),
        }
    }

    /// Unknown players read as neutral and rested.
    pub fn get(&self, player: &PlayerId) -> PlayerDynamics {
        self.players
            .get(player)
            .copied()
            .unwrap_or(PlayerDynamics::new(0.5, 0.0))
    }

    pub fn momentum(&self, player: &PlayerId) -> f32 {
        self.get(player).momentum
    }

    pub fn fatigue(&self, player: &PlayerId) -> f32 {
        self.get(player).fatigue
    }

    pub fn add_fatigue(&mut self, player: &PlayerId, amount: f32) {
        let entry = self.entry(player);
        entry.fatigue = clamp_unit(entry.fatigue + amount);
    }

    pub fn rest(&mut self, player: &PlayerId, amount: f32) {
        let entry = self.entry(player);
        entry.fatigue = clamp_unit(entry.fatigue - amount);
    }

    /// Move the point winner's momentum up and the loser's down.
    pub fn record_point(&mut self, winner: &PlayerId, loser: &PlayerId, config: &DynamicsConfig) {
        let w = self.entry(winner);
        w.momentum = clamp_unit(w.momentum + config.momentum_win_step);
        let l = self.entry(loser);
        l.momentum = clamp_unit(l.momentum - config.momentum_loss_step);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerDynamics)> {
        self.players.iter()
    }

    fn entry(&mut self, player: &PlayerId) -> &mut PlayerDynamics {
        self.players
            .entry(player.clone())
            .or_insert(PlayerDynamics::new(0.5, 0.0))
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
