use crate::config::SimConfig;
use crate::court::Court;
use crate::shots::{Shot, ShotCatalog, ShotCategory};
use rally_core::{CourtPoint, PlayerProfile, Side};
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks the next shot from the hitter's position, skills and the shot
/// they are answering.
pub struct ShotSelector<'a> {
    catalog: &'a ShotCatalog,
    court: &'a Court,
    config: &'a SimConfig,
}

impl<'a> ShotSelector<'a> {
    pub fn new(catalog: &'a ShotCatalog, court: &'a Court, config: &'a SimConfig) -> Self {
        Self {
            catalog,
            court,
            config,
        }
    }

    /// A serve, or `None` when the catalog has no serve category.
    pub fn serve<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a Shot> {
        self.catalog
            .by_category(ShotCategory::Serve)
            .choose(rng)
            .copied()
    }

    /// Mid-rally choice. Never returns a serve.
    ///
    /// Rules are tried in order, each one falling through on a failed draw:
    /// answer the received shot, play at the net, approach from mid-court,
    /// hit cross-court from a wide position, then any baseline shot.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        profile: &PlayerProfile,
        side: Side,
        position: CourtPoint,
        received: Option<ShotCategory>,
        rng: &mut R,
    ) -> &'a Shot {
        let cfg = self.config;

        if let Some(received) = received {
            if let Some(shot) = self.draw(self.catalog.response_set(received), cfg.response_chance, rng) {
                return shot;
            }
        }

        let depth = self.court.depth_of(side, position);
        if depth < cfg.net_zone && profile.net_play > cfg.net_skill_floor {
            let chance = cfg.net_base_chance + profile.net_play * cfg.net_skill_chance;
            if let Some(shot) = self.draw(self.catalog.by_category(ShotCategory::Net), chance, rng) {
                return shot;
            }
        }

        if depth >= cfg.net_zone && depth < cfg.mid_zone {
            let approaches = self.catalog.by_category(ShotCategory::Approach);
            if let Some(shot) = self.draw(approaches, cfg.approach_chance, rng) {
                return shot;
            }
        }

        let lateral = self.court.lateral_of(position);
        let toward_right = if lateral < 1.0 / 3.0 {
            Some(true)
        } else if lateral > 2.0 / 3.0 {
            Some(false)
        } else {
            None
        };
        if let Some(toward_right) = toward_right {
            let pool = self
                .catalog
                .rally_shots()
                .into_iter()
                .filter(|s| {
                    if toward_right {
                        s.target_x > 0.6
                    } else {
                        s.target_x < 0.4
                    }
                })
                .collect();
            if let Some(shot) = self.draw(pool, cfg.cross_court_chance, rng) {
                return shot;
            }
        }

        let baseline = self.catalog.by_category(ShotCategory::Baseline);
        let pool = if baseline.is_empty() {
            self.catalog.rally_shots()
        } else {
            baseline
        };
        pool.choose(rng)
            .copied()
            .unwrap_or_else(|| self.catalog.fallback())
    }

    /// With probability `chance`, a uniform pick from a non-empty `pool`.
    fn draw<R: Rng + ?Sized>(&self, pool: Vec<&'a Shot>, chance: f32, rng: &mut R) -> Option<&'a Shot> {
        if pool.is_empty() || !rng.gen_bool(probability(chance)) {
            return None;
        }
        pool.choose(rng).copied()
    }
}

/// Clamp into a valid Bernoulli parameter. NaN counts as 0.
pub(crate) fn probability(p: f32) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        f64::from(p.clamp(0.0, 1.0))
    }
}
