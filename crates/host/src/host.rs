use crate::config::SessionConfig;
use rally_core::{
    Beat, DynamicsTable, MatchPair, MatchSnapshot, PlayerId, PlayerStats, PointEnding,
    PointEngine, PointOutcome, PresentationSink, RotationError, RotationLedger,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::debug;

const INITIAL_REASON: &str = "initial seating";

#[derive(Debug, Default)]
pub struct RunResult {
    pub snapshots: Vec<MatchSnapshot>,
    pub points_played: u64,
    pub endings: HashMap<PointEnding, u64>,
}

/// Result of one [`SessionHost::step_point`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub point: PointOutcome,
    /// Match score after the point, near player first.
    pub score: (u32, u32),
    /// Set when the point decided the match.
    pub completed: Option<MatchSnapshot>,
}

struct LiveMatch {
    pair: MatchPair,
    score: [u32; 2],
}

/// Drives matches between the active pair and hands results to the ledger.
///
/// Fully deterministic for a given seed and engine configuration.
pub struct SessionHost<E: PointEngine> {
    config: SessionConfig,
    engine: E,
    ledger: RotationLedger,
    dynamics: DynamicsTable,
    stats: [PlayerStats; 3],
    rng: ChaCha8Rng,
    live: Option<LiveMatch>,
    points_played: u64,
}

impl<E: PointEngine> SessionHost<E> {
    pub fn new(config: SessionConfig, engine_config: E::Config) -> Result<Self, RotationError> {
        config.validate()?;
        let players = config.roster.ids();
        let ledger = RotationLedger::new(players.clone(), config.max_streak)?;
        let dynamics = DynamicsTable::new(&players, &config.dynamics);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            engine: E::new(engine_config),
            ledger,
            dynamics,
            stats: [PlayerStats::default(); 3],
            rng,
            live: None,
            points_played: 0,
            config,
        })
    }

    /// Tell the sink who is on court and who sits out.
    pub fn announce<S: PresentationSink + ?Sized>(&self, sink: &mut S) {
        sink.players_initialized(
            self.ledger.current_active(),
            self.ledger.current_bench(),
            INITIAL_REASON,
        );
        sink.stats_updated(&self.stats());
    }

    /// Play one point, starting a match first if none is running.
    pub fn step_point<S: PresentationSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<StepOutcome, RotationError> {
        let mut live = match self.live.take() {
            Some(live) => live,
            None => self.start_match(sink)?,
        };

        let bench = self.ledger.current_bench().clone();
        let point = self.engine.play_settled_point(
            &live.pair,
            &mut self.dynamics,
            &self.config.dynamics,
            &mut self.rng,
            sink,
        );
        self.points_played += 1;

        let winner = live.pair.id(point.winner);
        self.dynamics
            .rest(&bench, self.config.dynamics.bench_recovery_per_point);

        live.score[point.winner.index()] += 1;
        let score = (live.score[0], live.score[1]);
        sink.score_updated(score, live.pair.ids());
        sink.beat(Beat::PointOver);

        if live.score[point.winner.index()] < self.config.points_to_win {
            self.live = Some(live);
            return Ok(StepOutcome {
                point,
                score,
                completed: None,
            });
        }

        let winner = winner.clone();
        let snapshot = self.ledger.record_match(&winner, score)?;
        self.record_stats(&snapshot);
        debug!(
            match_number = snapshot.match_number,
            winner = %snapshot.winner,
            loser = %snapshot.loser,
            forced_bench = snapshot.forced_bench,
            "match completed"
        );

        let reason = if snapshot.forced_bench {
            format!("resting after {} straight wins", self.ledger.max_streak())
        } else {
            format!("lost to {}", snapshot.winner)
        };
        sink.match_completed(&snapshot);
        sink.stats_updated(&self.stats());
        sink.players_initialized(
            (&snapshot.active_after.0, &snapshot.active_after.1),
            &snapshot.bench_after,
            &reason,
        );
        sink.beat(Beat::MatchOver);

        Ok(StepOutcome {
            point,
            score,
            completed: Some(snapshot),
        })
    }

    /// Play points until the current (or next) match is decided.
    pub fn play_match<S: PresentationSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<MatchSnapshot, RotationError> {
        loop {
            if let Some(snapshot) = self.step_point(sink)?.completed {
                return Ok(snapshot);
            }
        }
    }

    pub fn run_for_matches<S: PresentationSink + ?Sized>(
        &mut self,
        matches: u64,
        sink: &mut S,
    ) -> Result<RunResult, RotationError> {
        let mut result = RunResult::default();
        while (result.snapshots.len() as u64) < matches {
            let step = self.step_point(sink)?;
            result.points_played += 1;
            *result.endings.entry(step.point.ending).or_default() += 1;
            if let Some(snapshot) = step.completed {
                result.snapshots.push(snapshot);
            }
        }
        Ok(result)
    }

    /// Back to the initial arrangement with fresh dynamics and stats.
    ///
    /// The random stream is not reseeded.
    pub fn reset<S: PresentationSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), RotationError> {
        let players = self.config.roster.ids();
        self.ledger.reset(players.clone())?;
        self.dynamics = DynamicsTable::new(&players, &self.config.dynamics);
        self.stats = [PlayerStats::default(); 3];
        self.live = None;
        self.points_played = 0;
        debug!("session reset");
        self.announce(sink);
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn ledger(&self) -> &RotationLedger {
        &self.ledger
    }

    pub fn dynamics(&self) -> &DynamicsTable {
        &self.dynamics
    }

    /// Per-player statistics in roster order.
    pub fn stats(&self) -> Vec<(PlayerId, PlayerStats)> {
        self.ledger
            .players()
            .iter()
            .cloned()
            .zip(self.stats)
            .collect()
    }

    /// Score of the match in progress, near player first.
    pub fn live_score(&self) -> Option<(u32, u32)> {
        self.live
            .as_ref()
            .map(|live| (live.score[0], live.score[1]))
    }

    pub fn points_played(&self) -> u64 {
        self.points_played
    }

    pub fn matches_played(&self) -> usize {
        self.ledger.history().len()
    }

    fn start_match<S: PresentationSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<LiveMatch, RotationError> {
        let (near, far) = self.ledger.current_active();
        let competitor = |id: &PlayerId| {
            self.config.roster.competitor(id).ok_or_else(|| {
                RotationError::InvalidConfiguration(format!("{id} is not on the roster"))
            })
        };
        let pair = MatchPair::new(competitor(near)?, competitor(far)?);
        sink.score_updated((0, 0), pair.ids());
        Ok(LiveMatch { pair, score: [0; 2] })
    }

    fn record_stats(&mut self, snapshot: &MatchSnapshot) {
        for (seat, player) in self.ledger.players().iter().enumerate() {
            let stats = &mut self.stats[seat];
            if *player == snapshot.winner {
                stats.wins += 1;
            } else if *player == snapshot.loser {
                stats.losses += 1;
            }
            stats.current_streak = self.ledger.streak_of(player);
        }
    }
}

impl<E: PointEngine> std::fmt::Debug for SessionHost<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHost")
            .field("active", &self.ledger.current_active())
            .field("bench", &self.ledger.current_bench())
            .field("matches_played", &self.matches_played())
            .field("points_played", &self.points_played)
            .finish()
    }
}
