use crate::dynamics::{DynamicsConfig, DynamicsTable};
use crate::pacing::Beat;
use crate::sink::PresentationSink;
use crate::types::{Competitor, PlayerId, Side};
use rand::Rng;
use serde::Serialize;

/// The two players on court, indexed by [`Side`].
#[derive(Clone, Debug, PartialEq)]
pub struct MatchPair {
    players: [Competitor; 2],
}

impl MatchPair {
    pub fn new(near: Competitor, far: Competitor) -> Self {
        Self {
            players: [near, far],
        }
    }

    pub fn get(&self, side: Side) -> &Competitor {
        &self.players[side.index()]
    }

    pub fn id(&self, side: Side) -> &PlayerId {
        &self.players[side.index()].id
    }

    /// Near player first.
    pub fn ids(&self) -> (&PlayerId, &PlayerId) {
        (&self.players[0].id, &self.players[1].id)
    }

    pub fn side_of(&self, player: &PlayerId) -> Option<Side> {
        [Side::Near, Side::Far]
            .into_iter()
            .find(|&side| self.id(side) == player)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointEnding {
    Ace,
    CleanWinner,
    UnforcedError,
    PassedOpponent,
    /// Rally hit the safety cap and the winner was drawn at random.
    RallyCap,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointOutcome {
    pub winner: Side,
    /// Shots struck, the serve included.
    pub rally_length: u32,
    pub ending: PointEnding,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub winner: Side,
    /// Near player's points first.
    pub score: (u32, u32),
}

/// Resolves points between two competitors.
///
/// Implementations own the point-level model only. Momentum is moved by
/// the caller between points; fatigue from the rally itself is applied by
/// the engine.
pub trait PointEngine: Sized {
    type Config: Clone + Send + Sync + 'static;

    fn new(config: Self::Config) -> Self;

    fn play_point<R, S>(
        &self,
        pair: &MatchPair,
        dynamics: &mut DynamicsTable,
        rng: &mut R,
        sink: &mut S,
    ) -> PointOutcome
    where
        R: Rng + ?Sized,
        S: PresentationSink + ?Sized;

    /// One point followed by the momentum update for its result.
    ///
    /// Every match loop goes through here so that a seed produces the same
    /// dynamics whichever loop drives it.
    fn play_settled_point<R, S>(
        &self,
        pair: &MatchPair,
        dynamics: &mut DynamicsTable,
        dynamics_config: &DynamicsConfig,
        rng: &mut R,
        sink: &mut S,
    ) -> PointOutcome
    where
        R: Rng + ?Sized,
        S: PresentationSink + ?Sized,
    {
        let point = self.play_point(pair, dynamics, rng, sink);
        dynamics.record_point(
            pair.id(point.winner),
            pair.id(point.winner.opposite()),
            dynamics_config,
        );
        point
    }

    /// First to `points_to_win`, no margin rule.
    ///
    /// Only the two players on court are known here, so no bench recovery
    /// is applied. A session host that tracks the bench adds it per point.
    fn play_match<R, S>(
        &self,
        pair: &MatchPair,
        points_to_win: u32,
        dynamics: &mut DynamicsTable,
        dynamics_config: &DynamicsConfig,
        rng: &mut R,
        sink: &mut S,
    ) -> MatchOutcome
    where
        R: Rng + ?Sized,
        S: PresentationSink + ?Sized,
    {
        let target = points_to_win.max(1);
        let mut score = [0u32; 2];
        sink.score_updated((0, 0), pair.ids());

        while score[0] < target && score[1] < target {
            let point = self.play_settled_point(pair, dynamics, dynamics_config, rng, sink);
            score[point.winner.index()] += 1;
            sink.score_updated((score[0], score[1]), pair.ids());
            sink.beat(Beat::PointOver);
        }

        let winner = if score[0] >= target {
            Side::Near
        } else {
            Side::Far
        };
        MatchOutcome {
            winner,
            score: (score[0], score[1]),
        }
    }
}
