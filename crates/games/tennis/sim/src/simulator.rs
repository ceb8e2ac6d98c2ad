use crate::config::TennisConfig;
use crate::selection::{probability, ShotSelector};
use crate::shots::{Shot, ShotCategory};
use rally_core::{
    Beat, CourtPoint, DynamicsTable, MatchPair, PlayerProfile, PointEnding, PointEngine,
    PointOutcome, PresentationSink, Side,
};
use rand::Rng;
use tracing::{trace, warn};

/// Stochastic singles point model.
pub struct TennisSimulator {
    config: TennisConfig,
}

impl TennisSimulator {
    pub fn config(&self) -> &TennisConfig {
        &self.config
    }

    fn selector(&self) -> ShotSelector<'_> {
        ShotSelector::new(&self.config.shots, &self.config.court, &self.config.sim)
    }

    /// The three per-exchange checks, in order. `None` keeps the rally going.
    fn resolve_exchange<R: Rng + ?Sized>(
        &self,
        pair: &MatchPair,
        dynamics: &DynamicsTable,
        hitter: Side,
        shot: &Shot,
        gap: f32,
        rng: &mut R,
    ) -> Option<PointEnding> {
        let sim = &self.config.sim;
        let striker = pair.get(hitter);
        let opponent = pair.get(hitter.opposite());

        let momentum = dynamics.momentum(&striker.id);
        let fatigue = dynamics.fatigue(&striker.id);
        let skill_bonus = (category_skill(&striker.profile, shot.category) - 0.5) * sim.skill_weight;
        let clean = shot.winner_chance
            * (1.0 + skill_bonus + (momentum - 0.5) * sim.momentum_weight
                - fatigue * sim.fatigue_winner_penalty);
        if rng.gen_bool(probability(clean)) {
            return Some(PointEnding::CleanWinner);
        }

        let opp_fatigue = dynamics.fatigue(&opponent.id);
        let error = sim.base_error
            + (1.0 - opponent.profile.consistency) * sim.inconsistency_error
            + opp_fatigue * sim.fatigue_error;
        if rng.gen_bool(probability(error)) {
            return Some(PointEnding::UnforcedError);
        }

        let reach = sim.reach_base + opponent.profile.speed * sim.reach_per_speed
            - opp_fatigue * sim.reach_fatigue_loss;
        if gap > reach && rng.gen_bool(probability(sim.passed_chance)) {
            return Some(PointEnding::PassedOpponent);
        }

        None
    }
}

impl PointEngine for TennisSimulator {
    type Config = TennisConfig;

    fn new(config: TennisConfig) -> Self {
        Self { config }
    }

    fn play_point<R, S>(
        &self,
        pair: &MatchPair,
        dynamics: &mut DynamicsTable,
        rng: &mut R,
        sink: &mut S,
    ) -> PointOutcome
    where
        R: Rng + ?Sized,
        S: PresentationSink + ?Sized,
    {
        let sim = &self.config.sim;
        let court = &self.config.court;
        let selector = self.selector();

        let server = if rng.gen_bool(0.5) { Side::Near } else { Side::Far };
        let receiver = server.opposite();
        let mut positions = [CourtPoint::default(); 2];
        positions[server.index()] = court.serve_stance(server);
        positions[receiver.index()] = court.return_stance(receiver);
        emit_positions(pair, &positions, sink);
        let mut ball = positions[server.index()];
        sink.ball_moved(ball, true);
        sink.beat(Beat::Ready);
        sink.beat(Beat::Toss);

        let server_profile = &pair.get(server).profile;
        let serve = match selector.serve(rng) {
            Some(shot) => shot,
            None => selector.choose(server_profile, server, ball, None, rng),
        };

        let outcome = if rng.gen_bool(probability(server_profile.serve * sim.ace_coefficient)) {
            ball = court.landing(server, serve);
            sink.ball_moved(ball, true);
            sink.beat(Beat::Exchange { tempo: serve.speed });
            Some(PointOutcome {
                winner: server,
                rally_length: 1,
                ending: PointEnding::Ace,
            })
        } else {
            let mut hitter = server;
            let mut shot = serve;
            let mut received: Option<ShotCategory> = None;
            let mut decided = None;

            for exchange in 1..=sim.rally_cap {
                let opponent = hitter.opposite();
                if exchange > 1 {
                    let profile = &pair.get(hitter).profile;
                    shot = selector.choose(profile, hitter, positions[hitter.index()], received, rng);
                }

                ball = court.landing(hitter, shot);
                let gap = ball.distance_to(positions[opponent.index()]);
                positions[opponent.index()] = court.retrieve_position(opponent, ball);
                positions[hitter.index()] = court.recovery_position(hitter, shot);
                sink.ball_moved(ball, true);
                emit_positions(pair, &positions, sink);
                sink.beat(Beat::Exchange { tempo: shot.speed });

                if let Some(ending) = self.resolve_exchange(pair, dynamics, hitter, shot, gap, rng) {
                    decided = Some(PointOutcome {
                        winner: hitter,
                        rally_length: exchange,
                        ending,
                    });
                    break;
                }
                received = Some(shot.category);
                hitter = opponent;
            }
            decided
        };

        let outcome = outcome.unwrap_or_else(|| {
            warn!(
                rally_cap = sim.rally_cap,
                near = %pair.id(Side::Near),
                far = %pair.id(Side::Far),
                "rally reached the cap, drawing the winner"
            );
            let winner = if rng.gen_bool(0.5) { Side::Near } else { Side::Far };
            PointOutcome {
                winner,
                rally_length: sim.rally_cap,
                ending: PointEnding::RallyCap,
            }
        });

        sink.ball_moved(ball, false);
        let load = sim.fatigue_per_shot * outcome.rally_length as f32;
        dynamics.add_fatigue(pair.id(Side::Near), load);
        dynamics.add_fatigue(pair.id(Side::Far), load);

        trace!(
            winner = %pair.id(outcome.winner),
            rally = outcome.rally_length,
            ending = ?outcome.ending,
            "point decided"
        );
        outcome
    }
}

fn category_skill(profile: &PlayerProfile, category: ShotCategory) -> f32 {
    match category {
        ShotCategory::Baseline => (profile.forehand + profile.backhand) / 2.0,
        ShotCategory::Net => profile.net_play,
        ShotCategory::Approach => (profile.forehand + profile.net_play) / 2.0,
        ShotCategory::Serve => profile.serve,
    }
}

fn emit_positions<S: PresentationSink + ?Sized>(
    pair: &MatchPair,
    positions: &[CourtPoint; 2],
    sink: &mut S,
) {
    let update = [
        (pair.id(Side::Near).clone(), positions[0]),
        (pair.id(Side::Far).clone(), positions[1]),
    ];
    sink.positions_updated(&update);
}
