//! Winner-stays-on rotation with streak-forced rest.
//!
//! The ledger tracks which two players are on court, who rests, and each
//! player's consecutive-win streak. Every transition goes through
//! [`Arrangement::transition`], a pure function over seat indices, so the
//! whole state space can be enumerated in tests.

use crate::error::RotationError;
use crate::types::PlayerId;
use serde::Serialize;

/// A partition of the three seats into an ordered active pair and a bench.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Arrangement {
    pub active: [usize; 2],
    pub bench: usize,
}

impl Arrangement {
    /// Seats 0 and 1 on court, seat 2 resting.
    pub const INITIAL: Self = Self {
        active: [0, 1],
        bench: 2,
    };

    /// Every ordered arrangement of three seats.
    pub fn all() -> [Self; 6] {
        [
            Self { active: [0, 1], bench: 2 },
            Self { active: [1, 0], bench: 2 },
            Self { active: [0, 2], bench: 1 },
            Self { active: [2, 0], bench: 1 },
            Self { active: [1, 2], bench: 0 },
            Self { active: [2, 1], bench: 0 },
        ]
    }

    pub fn is_active(self, seat: usize) -> bool {
        self.active.contains(&seat)
    }

    /// The other active seat, if `winner` is on court.
    pub fn opponent_of(self, winner: usize) -> Option<usize> {
        match self.active {
            [a, b] if a == winner => Some(b),
            [a, b] if b == winner => Some(a),
            _ => None,
        }
    }

    /// Arrangement after `winner` takes the match.
    ///
    /// Without forced rest the winner stays on and the previous bench player
    /// replaces the loser. With forced rest the winner sits out and the
    /// previous bench player faces the loser straight away.
    pub fn transition(self, winner: usize, forced_rest: bool) -> Option<Self> {
        let loser = self.opponent_of(winner)?;
        let entering = self.bench;

        if forced_rest {
            Some(Self {
                active: [entering, loser],
                bench: winner,
            })
        } else {
            Some(Self {
                active: [winner, entering],
                bench: loser,
            })
        }
    }
}

/// Immutable record of one completed match and the arrangement it produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    /// 1-based position in the session history.
    pub match_number: u64,
    pub winner: PlayerId,
    pub loser: PlayerId,
    /// Winner's points first.
    pub final_score: (u32, u32),
    pub active_after: (PlayerId, PlayerId),
    pub bench_after: PlayerId,
    pub forced_bench: bool,
    /// Winner's streak after the transition, 0 when forced rest fired.
    pub streak_after: u32,
}

#[derive(Clone, Debug)]
pub struct RotationLedger {
    players: [PlayerId; 3],
    arrangement: Arrangement,
    streaks: [u32; 3],
    max_streak: u32,
    history: Vec<MatchSnapshot>,
}

impl RotationLedger {
    /// The first two players start on court, the third on the bench.
    pub fn new(players: [PlayerId; 3], max_streak: u32) -> Result<Self, RotationError> {
        if max_streak < 1 {
            return Err(RotationError::InvalidConfiguration(
                "max_streak must be at least 1".into(),
            ));
        }
        check_distinct(&players)?;

        Ok(Self {
            players,
            arrangement: Arrangement::INITIAL,
            streaks: [0; 3],
            max_streak,
            history: Vec::new(),
        })
    }

    pub fn current_active(&self) -> (&PlayerId, &PlayerId) {
        let [a, b] = self.arrangement.active;
        (&self.players[a], &self.players[b])
    }

    pub fn current_bench(&self) -> &PlayerId {
        &self.players[self.arrangement.bench]
    }

    /// Consecutive wins for `player`, 0 for unknown names.
    pub fn streak_of(&self, player: &PlayerId) -> u32 {
        self.seat_of(player).map_or(0, |seat| self.streaks[seat])
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    pub fn players(&self) -> &[PlayerId; 3] {
        &self.players
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn history(&self) -> &[MatchSnapshot] {
        &self.history
    }

    /// Register a completed match.
    ///
    /// `score` is ordered like [`current_active`](Self::current_active).
    /// Fails without touching any state if `winner` is not on court.
    pub fn record_match(
        &mut self,
        winner: &PlayerId,
        score: (u32, u32),
    ) -> Result<MatchSnapshot, RotationError> {
        let invalid = || RotationError::InvalidParticipant {
            winner: winner.clone(),
        };
        let winner_seat = self
            .seat_of(winner)
            .filter(|&seat| self.arrangement.is_active(seat))
            .ok_or_else(invalid)?;
        let loser_seat = self
            .arrangement
            .opponent_of(winner_seat)
            .ok_or_else(invalid)?;

        let winner_streak = self.streaks[winner_seat] + 1;
        let forced_bench = winner_streak >= self.max_streak;
        let next = self
            .arrangement
            .transition(winner_seat, forced_bench)
            .ok_or_else(invalid)?;

        let final_score = if self.arrangement.active[0] == winner_seat {
            score
        } else {
            (score.1, score.0)
        };

        self.streaks[loser_seat] = 0;
        self.streaks[winner_seat] = if forced_bench { 0 } else { winner_streak };
        self.arrangement = next;

        if forced_bench {
            tracing::debug!(
                player = %winner,
                streak = winner_streak,
                "forced rest after streak"
            );
        }

        let (a, b) = self.current_active();
        let snapshot = MatchSnapshot {
            match_number: self.history.len() as u64 + 1,
            winner: winner.clone(),
            loser: self.players[loser_seat].clone(),
            final_score,
            active_after: (a.clone(), b.clone()),
            bench_after: self.current_bench().clone(),
            forced_bench,
            streak_after: self.streaks[winner_seat],
        };
        self.history.push(snapshot.clone());
        Ok(snapshot)
    }

    /// Return to the constructor state with a (possibly new) set of players.
    pub fn reset(&mut self, players: [PlayerId; 3]) -> Result<(), RotationError> {
        check_distinct(&players)?;
        self.players = players;
        self.arrangement = Arrangement::INITIAL;
        self.streaks = [0; 3];
        self.history.clear();
        Ok(())
    }

    fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }
}

fn check_distinct(players: &[PlayerId; 3]) -> Result<(), RotationError> {
    if players[0] == players[1] || players[0] == players[2] || players[1] == players[2] {
        return Err(RotationError::InvalidConfiguration(
            "player names must be distinct".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids() -> [PlayerId; 3] {
        ["A".into(), "B".into(), "C".into()]
    }

    fn ledger(max_streak: u32) -> RotationLedger {
        RotationLedger::new(ids(), max_streak).unwrap()
    }

    fn pid(name: &str) -> PlayerId {
        PlayerId::from(name)
    }

    #[test]
    fn test_initial_state() {
        let l = ledger(3);
        assert_eq!(l.current_active(), (&pid("A"), &pid("B")));
        assert_eq!(l.current_bench(), &pid("C"));
        assert!(l.history().is_empty());
        assert_eq!(l.streak_of(&pid("A")), 0);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            RotationLedger::new(ids(), 0),
            Err(RotationError::InvalidConfiguration(_))
        ));
        assert!(RotationLedger::new(["A".into(), "A".into(), "C".into()], 3).is_err());
    }

    #[test]
    fn test_winner_stays_on_and_loser_swaps_with_bench() {
        let mut l = ledger(3);
        let snap = l.record_match(&pid("A"), (3, 1)).unwrap();

        assert_eq!(l.current_active(), (&pid("A"), &pid("C")));
        assert_eq!(l.current_bench(), &pid("B"));
        assert_eq!(l.streak_of(&pid("A")), 1);
        assert_eq!(snap.loser, pid("B"));
        assert_eq!(snap.final_score, (3, 1));
        assert!(!snap.forced_bench);
        assert_eq!(snap.streak_after, 1);
        assert_eq!(snap.match_number, 1);
    }

    #[test]
    fn test_three_straight_wins_force_rest() {
        let mut l = ledger(3);

        l.record_match(&pid("A"), (3, 0)).unwrap();
        assert_eq!(l.current_active(), (&pid("A"), &pid("C")));
        assert_eq!(l.current_bench(), &pid("B"));

        l.record_match(&pid("A"), (3, 2)).unwrap();
        assert_eq!(l.current_active(), (&pid("A"), &pid("B")));
        assert_eq!(l.current_bench(), &pid("C"));
        assert_eq!(l.streak_of(&pid("A")), 2);

        let snap = l.record_match(&pid("A"), (3, 1)).unwrap();
        assert!(snap.forced_bench);
        assert_eq!(snap.streak_after, 0);
        assert_eq!(l.current_active(), (&pid("C"), &pid("B")));
        assert_eq!(l.current_bench(), &pid("A"));
        assert_eq!(l.streak_of(&pid("A")), 0);
        // The player who just lost is straight back on court.
        assert_eq!(snap.loser, pid("B"));
        assert_eq!(snap.active_after.1, pid("B"));
    }

    #[test]
    fn test_max_streak_one_benches_every_winner() {
        let mut l = ledger(1);
        let snap = l.record_match(&pid("B"), (1, 3)).unwrap();
        assert!(snap.forced_bench);
        assert_eq!(snap.final_score, (3, 1));
        assert_eq!(l.current_active(), (&pid("C"), &pid("A")));
        assert_eq!(l.current_bench(), &pid("B"));
    }

    #[test]
    fn test_loss_clears_streak() {
        let mut l = ledger(3);
        l.record_match(&pid("A"), (3, 0)).unwrap();
        l.record_match(&pid("C"), (1, 3)).unwrap();
        assert_eq!(l.streak_of(&pid("A")), 0);
        assert_eq!(l.streak_of(&pid("C")), 1);
        assert_eq!(l.current_active(), (&pid("C"), &pid("B")));
        assert_eq!(l.current_bench(), &pid("A"));
    }

    #[test]
    fn test_invalid_participant_leaves_state_unchanged() {
        let mut l = ledger(3);
        l.record_match(&pid("A"), (3, 0)).unwrap();
        let before = (l.arrangement(), l.streak_of(&pid("A")), l.history().len());

        let err = l.record_match(&pid("B"), (3, 0)).unwrap_err();
        assert_eq!(err, RotationError::InvalidParticipant { winner: pid("B") });
        assert!(l.record_match(&pid("Z"), (3, 0)).is_err());

        let after = (l.arrangement(), l.streak_of(&pid("A")), l.history().len());
        assert_eq!(before, after);
    }

    #[test]
    fn test_reset_restores_initial_configuration() {
        let mut l = ledger(3);
        for _ in 0..4 {
            let winner = l.current_active().0.clone();
            l.record_match(&winner, (3, 0)).unwrap();
        }
        l.reset(ids()).unwrap();

        assert_eq!(l.arrangement(), Arrangement::INITIAL);
        assert!(l.history().is_empty());
        for p in ids() {
            assert_eq!(l.streak_of(&p), 0);
        }
    }

    #[test]
    fn test_failed_reset_keeps_previous_players() {
        let mut l = ledger(3);
        l.record_match(&pid("A"), (3, 0)).unwrap();
        assert!(l.reset(["X".into(), "X".into(), "Y".into()]).is_err());
        assert_eq!(l.players(), &ids());
        assert_eq!(l.history().len(), 1);
    }

    #[test]
    fn test_transition_enumeration() {
        for arrangement in Arrangement::all() {
            for seat in 0..3 {
                for forced in [false, true] {
                    let next = arrangement.transition(seat, forced);
                    if !arrangement.is_active(seat) {
                        assert_eq!(next, None);
                        continue;
                    }
                    let next = next.unwrap();
                    let loser = arrangement.opponent_of(seat).unwrap();
                    let mut seats = [next.active[0], next.active[1], next.bench];
                    seats.sort_unstable();
                    assert_eq!(seats, [0, 1, 2]);

                    if forced {
                        assert_eq!(next.bench, seat);
                        assert_eq!(next.active, [arrangement.bench, loser]);
                    } else {
                        assert_eq!(next.bench, loser);
                        assert_eq!(next.active, [seat, arrangement.bench]);
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn test_rotation_invariants_hold(
            max_streak in 1u32..5,
            picks in proptest::collection::vec(any::<bool>(), 0..60),
        ) {
            let mut l = ledger(max_streak);
            for pick_first in picks {
                let (a, b) = l.current_active();
                let winner = if pick_first { a.clone() } else { b.clone() };
                l.record_match(&winner, (3, 1)).unwrap();

                let (a, b) = l.current_active();
                let bench = l.current_bench();
                prop_assert_ne!(a, b);
                prop_assert_ne!(a, bench);
                prop_assert_ne!(b, bench);

                let hot = ids().iter().filter(|p| l.streak_of(p) > 0).count();
                prop_assert!(hot <= 1);
                prop_assert!(ids().iter().all(|p| l.streak_of(p) < max_streak));
            }
        }
    }
}
