use crate::shots::{Shot, ShotCategory};
use rally_core::{CourtPoint, Side};
use serde::Deserialize;

/// Court geometry in court units.
///
/// `y` grows towards the near baseline. The far half mirrors the near half
/// around `net_y`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Court {
    pub play_left: f32,
    pub play_right: f32,
    pub net_y: f32,
    pub near_baseline_y: f32,
    pub near_net_y: f32,
    pub far_baseline_y: f32,
    pub far_net_y: f32,
    /// Balls landing further than this past the net are taken from the baseline.
    pub deep_ball_margin: f32,
    /// How far behind a short ball the retriever stands.
    pub retrieve_offset: f32,
    pub recovery_x_offset: f32,
    pub net_recovery_offset: f32,
    pub baseline_recovery_offset: f32,
    /// Where the bench player is drawn.
    pub bench: CourtPoint,
}

impl Default for Court {
    fn default() -> Self {
        Self {
            play_left: 49.0,
            play_right: 251.0,
            net_y: 200.0,
            near_baseline_y: 355.0,
            near_net_y: 235.0,
            far_baseline_y: 45.0,
            far_net_y: 165.0,
            deep_ball_margin: 80.0,
            retrieve_offset: 30.0,
            recovery_x_offset: 15.0,
            net_recovery_offset: 15.0,
            baseline_recovery_offset: 8.0,
            bench: CourtPoint::new(350.0, 195.0),
        }
    }
}

impl Court {
    pub fn play_width(&self) -> f32 {
        self.play_right - self.play_left
    }

    pub fn center_x(&self) -> f32 {
        self.play_left + self.play_width() / 2.0
    }

    /// Map a lateral fraction and side-relative depth onto `side`.
    pub fn position(&self, side: Side, lateral: f32, depth: f32) -> CourtPoint {
        let x = self.play_left + lateral * self.play_width();
        let y = match side {
            Side::Near => self.near_net_y + depth * (self.near_baseline_y - self.near_net_y),
            Side::Far => self.far_net_y - depth * (self.far_net_y - self.far_baseline_y),
        };
        CourtPoint::new(x, y)
    }

    /// 0 on the net-zone line, 1 on the baseline, negative inside the net zone.
    pub fn depth_of(&self, side: Side, point: CourtPoint) -> f32 {
        match side {
            Side::Near => (point.y - self.near_net_y) / (self.near_baseline_y - self.near_net_y),
            Side::Far => (self.far_net_y - point.y) / (self.far_net_y - self.far_baseline_y),
        }
    }

    pub fn lateral_of(&self, point: CourtPoint) -> f32 {
        (point.x - self.play_left) / self.play_width()
    }

    pub fn serve_stance(&self, side: Side) -> CourtPoint {
        self.position(side, 0.5, 1.0)
    }

    pub fn return_stance(&self, side: Side) -> CourtPoint {
        self.position(side, 0.5, 0.9)
    }

    /// Landing spot of `shot` struck from `hitter`'s half.
    pub fn landing(&self, hitter: Side, shot: &Shot) -> CourtPoint {
        self.position(hitter.opposite(), shot.target_x, shot.depth)
    }

    /// Where the player on `side` meets a ball landing at `landing`.
    pub fn retrieve_position(&self, side: Side, landing: CourtPoint) -> CourtPoint {
        let x = landing.x.clamp(self.play_left, self.play_right);
        let y = match side {
            Side::Near if landing.y > self.net_y + self.deep_ball_margin => self.near_baseline_y,
            Side::Near => (landing.y + self.retrieve_offset).max(self.near_net_y),
            Side::Far if landing.y < self.net_y - self.deep_ball_margin => self.far_baseline_y,
            Side::Far => (landing.y - self.retrieve_offset).min(self.far_net_y),
        };
        CourtPoint::new(x, y)
    }

    /// Where the hitter on `side` moves after playing `shot`.
    pub fn recovery_position(&self, side: Side, shot: &Shot) -> CourtPoint {
        let x = if shot.target_x > 0.5 {
            self.center_x() - self.recovery_x_offset
        } else {
            self.center_x() + self.recovery_x_offset
        };
        let forward = matches!(shot.category, ShotCategory::Net | ShotCategory::Approach);
        let y = match (side, forward) {
            (Side::Near, true) => self.near_net_y + self.net_recovery_offset,
            (Side::Near, false) => self.near_baseline_y - self.baseline_recovery_offset,
            (Side::Far, true) => self.far_net_y - self.net_recovery_offset,
            (Side::Far, false) => self.far_baseline_y + self.baseline_recovery_offset,
        };
        CourtPoint::new(x, y)
    }
}
