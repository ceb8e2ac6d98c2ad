use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Suspension point emitted by the simulation for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Beat {
    /// Players have taken their serve and return stances.
    Ready,
    /// Ball is tossed before the serve.
    Toss,
    /// One shot in flight. `tempo` is the shot's speed multiplier.
    Exchange { tempo: f32 },
    PointOver,
    MatchOver,
}

/// Wall-clock delay attached to each [`Beat`] at normal speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(with = "millis")]
    pub ready: Duration,
    #[serde(with = "millis")]
    pub toss: Duration,
    /// Multiplied by the shot tempo.
    #[serde(with = "millis")]
    pub base_shot: Duration,
    #[serde(with = "millis")]
    pub point_gap: Duration,
    /// Winner flash, rest before the next match and the inter-match interval.
    #[serde(with = "millis")]
    pub match_gap: Duration,
    /// Poll period while paused.
    #[serde(with = "millis")]
    pub idle_poll: Duration,
}

impl PacingConfig {
    /// Every delay set to zero except the pause poll.
    pub fn instant() -> Self {
        Self {
            ready: Duration::ZERO,
            toss: Duration::ZERO,
            base_shot: Duration::ZERO,
            point_gap: Duration::ZERO,
            match_gap: Duration::ZERO,
            idle_poll: Duration::from_millis(5),
        }
    }

    pub fn delay_for(&self, beat: Beat) -> Duration {
        match beat {
            Beat::Ready => self.ready,
            Beat::Toss => self.toss,
            Beat::Exchange { tempo } => scale_nanos(self.base_shot, f64::from(tempo.max(0.0))),
            Beat::PointOver => self.point_gap,
            Beat::MatchOver => self.match_gap,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            ready: Duration::from_millis(400),
            toss: Duration::from_millis(300),
            base_shot: Duration::from_millis(550),
            point_gap: Duration::from_millis(600),
            match_gap: Duration::from_millis(2500),
            idle_poll: Duration::from_millis(50),
        }
    }
}

/// Playback speed. Larger values shorten every delay.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeedMultiplier(f32);

impl SpeedMultiplier {
    pub const MIN: f32 = 0.25;
    pub const MAX: f32 = 4.0;
    pub const NORMAL: Self = Self(1.0);

    /// Clamp a positive, finite multiplier into `[MIN, MAX]`.
    /// Returns `None` for zero, negative or non-finite input.
    pub fn new(value: f32) -> Option<Self> {
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        Some(Self(value.clamp(Self::MIN, Self::MAX)))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn scale(self, delay: Duration) -> Duration {
        scale_nanos(delay, 1.0 / f64::from(self.0))
    }

    pub fn to_bits(self) -> u32 {
        self.0.to_bits()
    }

    pub fn from_bits(bits: u32) -> Self {
        Self::new(f32::from_bits(bits)).unwrap_or(Self::NORMAL)
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self::NORMAL
    }
}

fn scale_nanos(delay: Duration, factor: f64) -> Duration {
    Duration::from_nanos((delay.as_nanos() as f64 * factor).round() as u64)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_is_clamped() {
        assert_eq!(SpeedMultiplier::new(10.0).unwrap().get(), 4.0);
        assert_eq!(SpeedMultiplier::new(0.1).unwrap().get(), 0.25);
        assert_eq!(SpeedMultiplier::new(2.0).unwrap().get(), 2.0);
    }

    #[test]
    fn test_speed_rejects_non_positive() {
        assert!(SpeedMultiplier::new(0.0).is_none());
        assert!(SpeedMultiplier::new(-1.0).is_none());
        assert!(SpeedMultiplier::new(f32::NAN).is_none());
        assert!(SpeedMultiplier::new(f32::INFINITY).is_none());
    }

    #[test]
    fn test_speed_scales_delays() {
        let double = SpeedMultiplier::new(2.0).unwrap();
        assert_eq!(double.scale(Duration::from_millis(600)), Duration::from_millis(300));
        let quarter = SpeedMultiplier::new(0.25).unwrap();
        assert_eq!(quarter.scale(Duration::from_millis(100)), Duration::from_millis(400));
    }

    #[test]
    fn test_bits_round_trip() {
        let s = SpeedMultiplier::new(1.5).unwrap();
        assert_eq!(SpeedMultiplier::from_bits(s.to_bits()), s);
        assert_eq!(SpeedMultiplier::from_bits(0), SpeedMultiplier::NORMAL);
    }

    #[test]
    fn test_exchange_delay_follows_tempo() {
        let pacing = PacingConfig::default();
        assert_eq!(
            pacing.delay_for(Beat::Exchange { tempo: 0.5 }),
            Duration::from_millis(275)
        );
        assert_eq!(pacing.delay_for(Beat::MatchOver), Duration::from_millis(2500));
    }

    #[test]
    fn test_pacing_config_reads_millis() {
        let pacing: PacingConfig = serde_json::from_str(r#"{"ready": 10, "match_gap": 20}"#).unwrap();
        assert_eq!(pacing.ready, Duration::from_millis(10));
        assert_eq!(pacing.match_gap, Duration::from_millis(20));
        assert_eq!(pacing.toss, Duration::from_millis(300));
    }
}
