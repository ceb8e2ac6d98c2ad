//! Presentation side channel.
//!
//! The simulation pushes updates into a [`PresentationSink`]. Renderers
//! implement the trait directly or collect a `Vec<SessionEvent>` and replay
//! it later with [`SessionEvent::replay_into`]. Nothing flows back into the
//! simulation through this interface.

use crate::ledger::MatchSnapshot;
use crate::pacing::Beat;
use crate::types::{CourtPoint, PlayerId, PlayerStats};
use serde::Serialize;

pub trait PresentationSink {
    fn players_initialized(
        &mut self,
        _active: (&PlayerId, &PlayerId),
        _bench: &PlayerId,
        _reason: &str,
    ) {
    }

    fn positions_updated(&mut self, _positions: &[(PlayerId, CourtPoint)]) {}

    fn ball_moved(&mut self, _at: CourtPoint, _visible: bool) {}

    fn score_updated(&mut self, _score: (u32, u32), _active: (&PlayerId, &PlayerId)) {}

    fn match_completed(&mut self, _snapshot: &MatchSnapshot) {}

    fn stats_updated(&mut self, _stats: &[(PlayerId, PlayerStats)]) {}

    fn beat(&mut self, _beat: Beat) {}
}

/// Discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {}

/// Owned form of one [`PresentationSink`] call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PlayersInitialized {
        active: (PlayerId, PlayerId),
        bench: PlayerId,
        reason: String,
    },
    PositionsUpdated {
        positions: Vec<(PlayerId, CourtPoint)>,
    },
    BallMoved {
        at: CourtPoint,
        visible: bool,
    },
    ScoreUpdated {
        score: (u32, u32),
        active: (PlayerId, PlayerId),
    },
    MatchCompleted {
        snapshot: MatchSnapshot,
    },
    StatsUpdated {
        stats: Vec<(PlayerId, PlayerStats)>,
    },
    Beat {
        beat: Beat,
    },
}

impl SessionEvent {
    pub fn replay_into<S: PresentationSink + ?Sized>(&self, sink: &mut S) {
        match self {
            SessionEvent::PlayersInitialized {
                active,
                bench,
                reason,
            } => sink.players_initialized((&active.0, &active.1), bench, reason),
            SessionEvent::PositionsUpdated { positions } => sink.positions_updated(positions),
            SessionEvent::BallMoved { at, visible } => sink.ball_moved(*at, *visible),
            SessionEvent::ScoreUpdated { score, active } => {
                sink.score_updated(*score, (&active.0, &active.1))
            }
            SessionEvent::MatchCompleted { snapshot } => sink.match_completed(snapshot),
            SessionEvent::StatsUpdated { stats } => sink.stats_updated(stats),
            SessionEvent::Beat { beat } => sink.beat(*beat),
        }
    }

    pub fn as_beat(&self) -> Option<Beat> {
        match self {
            SessionEvent::Beat { beat } => Some(*beat),
            _ => None,
        }
    }
}

impl PresentationSink for Vec<SessionEvent> {
    fn players_initialized(
        &mut self,
        active: (&PlayerId, &PlayerId),
        bench: &PlayerId,
        reason: &str,
    ) {
        self.push(SessionEvent::PlayersInitialized {
            active: (active.0.clone(), active.1.clone()),
            bench: bench.clone(),
            reason: reason.to_owned(),
        });
    }

    fn positions_updated(&mut self, positions: &[(PlayerId, CourtPoint)]) {
        self.push(SessionEvent::PositionsUpdated {
            positions: positions.to_vec(),
        });
    }

    fn ball_moved(&mut self, at: CourtPoint, visible: bool) {
        self.push(SessionEvent::BallMoved { at, visible });
    }

    fn score_updated(&mut self, score: (u32, u32), active: (&PlayerId, &PlayerId)) {
        self.push(SessionEvent::ScoreUpdated {
            score,
            active: (active.0.clone(), active.1.clone()),
        });
    }

    fn match_completed(&mut self, snapshot: &MatchSnapshot) {
        self.push(SessionEvent::MatchCompleted {
            snapshot: snapshot.clone(),
        });
    }

    fn stats_updated(&mut self, stats: &[(PlayerId, PlayerStats)]) {
        self.push(SessionEvent::StatsUpdated {
            stats: stats.to_vec(),
        });
    }

    fn beat(&mut self, beat: Beat) {
        self.push(SessionEvent::Beat { beat });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collected_events_replay_in_order() {
        let a = PlayerId::from("A");
        let b = PlayerId::from("B");
        let mut first: Vec<SessionEvent> = Vec::new();
        first.score_updated((1, 0), (&a, &b));
        first.ball_moved(CourtPoint::new(10.0, 20.0), false);
        first.beat(Beat::PointOver);

        let mut second: Vec<SessionEvent> = Vec::new();
        for event in &first {
            event.replay_into(&mut second);
        }
        assert_eq!(first, second);
        assert_eq!(second[2].as_beat(), Some(Beat::PointOver));
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = SessionEvent::BallMoved {
            at: CourtPoint::new(1.0, 2.0),
            visible: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ball_moved");
        assert_eq!(json["at"]["y"], 2.0);
    }
}
