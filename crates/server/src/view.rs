use rally_core::{
    Beat, MatchSnapshot, PlayerDynamics, PlayerId, PlayerStats, PointEngine, SessionEvent,
};
use rally_host::SessionHost;

/// Session state as the published event stream has shown it so far.
///
/// The loop simulates a whole point before pacing its events out, so the
/// host runs ahead of viewers. Queries read this view instead. It advances
/// only as events are published; dynamics settle on the point's
/// `PointOver` beat.
#[derive(Clone, Debug)]
pub(crate) struct PublishedView {
    pub active: (PlayerId, PlayerId),
    pub bench: PlayerId,
    pub streaks: Vec<(PlayerId, u32)>,
    pub stats: Vec<(PlayerId, PlayerStats)>,
    pub dynamics: Vec<(PlayerId, PlayerDynamics)>,
    pub score: Option<(u32, u32)>,
    pub history: Vec<MatchSnapshot>,
    pub points_played: u64,
    /// Dynamics of the simulated point, waiting for its `PointOver` beat.
    pending_dynamics: Option<Vec<(PlayerId, PlayerDynamics)>>,
}

impl PublishedView {
    /// Mirror the host as it stands, with nothing pending.
    pub fn from_host<E: PointEngine>(host: &SessionHost<E>) -> Self {
        let ledger = host.ledger();
        let (near, far) = ledger.current_active();
        Self {
            active: (near.clone(), far.clone()),
            bench: ledger.current_bench().clone(),
            streaks: ledger
                .players()
                .iter()
                .map(|p| (p.clone(), ledger.streak_of(p)))
                .collect(),
            stats: host.stats(),
            dynamics: dynamics_of(host),
            score: host.live_score(),
            history: ledger.history().to_vec(),
            points_played: host.points_played(),
            pending_dynamics: None,
        }
    }

    /// Hold the host's post-point dynamics until the point is shown.
    pub fn stage_point<E: PointEngine>(&mut self, host: &SessionHost<E>) {
        self.pending_dynamics = Some(dynamics_of(host));
    }

    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::PlayersInitialized { active, bench, .. } => {
                self.active = active.clone();
                self.bench = bench.clone();
            }
            SessionEvent::ScoreUpdated { score, .. } => self.score = Some(*score),
            SessionEvent::MatchCompleted { snapshot } => {
                for (player, streak) in &mut self.streaks {
                    if *player == snapshot.winner {
                        *streak = snapshot.streak_after;
                    } else if *player == snapshot.loser {
                        *streak = 0;
                    }
                }
                self.score = None;
                self.history.push(snapshot.clone());
            }
            SessionEvent::StatsUpdated { stats } => self.stats = stats.clone(),
            SessionEvent::Beat {
                beat: Beat::PointOver,
            } => {
                self.points_played += 1;
                if let Some(dynamics) = self.pending_dynamics.take() {
                    self.dynamics = dynamics;
                }
            }
            SessionEvent::PositionsUpdated { .. }
            | SessionEvent::BallMoved { .. }
            | SessionEvent::Beat { .. } => {}
        }
    }
}

fn dynamics_of<E: PointEngine>(host: &SessionHost<E>) -> Vec<(PlayerId, PlayerDynamics)> {
    host.ledger()
        .players()
        .iter()
        .map(|p| (p.clone(), host.dynamics().get(p)))
        .collect()
}
