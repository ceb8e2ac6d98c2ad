use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotCategory {
    Baseline,
    Net,
    Approach,
    Serve,
}

/// A named stroke.
///
/// `target_x` is lateral (0 = left sideline, 1 = right sideline) and
/// `depth` is measured on the receiving half (0 = net-zone line,
/// 1 = baseline). `speed` is a flight-time multiplier, larger is slower.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Shot {
    pub name: String,
    pub target_x: f32,
    pub depth: f32,
    pub speed: f32,
    pub winner_chance: f32,
    pub category: ShotCategory,
}

impl Shot {
    pub fn new(
        name: impl Into<String>,
        target_x: f32,
        depth: f32,
        speed: f32,
        winner_chance: f32,
        category: ShotCategory,
    ) -> Self {
        Self {
            name: name.into(),
            target_x,
            depth,
            speed,
            winner_chance,
            category,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog needs at least one non-serve shot")]
    NoRallyShots,
    #[error("shot {name}: {field} out of range")]
    OutOfRange { name: String, field: &'static str },
}

/// Shots that answer a received shot of a given category.
const NET_RESPONSES: &[&str] = &["passing_shot_l", "passing_shot_r", "lob"];
const APPROACH_RESPONSES: &[&str] = &[
    "passing_shot_l",
    "passing_shot_r",
    "down_the_line",
    "down_the_line_r",
];

/// Read-only shot table. Holds at least one shot usable mid-rally.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Shot>")]
pub struct ShotCatalog {
    shots: Vec<Shot>,
    fallback: usize,
}

impl ShotCatalog {
    pub fn new(shots: Vec<Shot>) -> Result<Self, CatalogError> {
        for shot in &shots {
            check_unit(shot, "target_x", shot.target_x)?;
            check_unit(shot, "depth", shot.depth)?;
            check_unit(shot, "winner_chance", shot.winner_chance)?;
            if !(shot.speed.is_finite() && shot.speed > 0.0) {
                return Err(CatalogError::OutOfRange {
                    name: shot.name.clone(),
                    field: "speed",
                });
            }
        }
        let fallback = shots
            .iter()
            .position(|s| s.category != ShotCategory::Serve)
            .ok_or(CatalogError::NoRallyShots)?;
        Ok(Self { shots, fallback })
    }

    pub fn standard() -> Self {
        use ShotCategory::*;
        let shots = vec![
            Shot::new("cross_court_forehand", 0.8, 0.85, 0.8, 0.05, Baseline),
            Shot::new("cross_court_backhand", 0.2, 0.85, 0.8, 0.05, Baseline),
            Shot::new("down_the_line", 0.1, 0.9, 0.7, 0.08, Baseline),
            Shot::new("down_the_line_r", 0.9, 0.9, 0.7, 0.08, Baseline),
            Shot::new("drop_shot", 0.5, 0.1, 1.0, 0.15, Net),
            Shot::new("lob", 0.5, 0.95, 1.1, 0.10, Baseline),
            Shot::new("approach_shot", 0.5, 0.7, 0.6, 0.03, Approach),
            Shot::new("volley", 0.3, 0.3, 0.4, 0.20, Net),
            Shot::new("volley_r", 0.7, 0.3, 0.4, 0.20, Net),
            Shot::new("passing_shot_l", 0.05, 0.8, 0.5, 0.25, Baseline),
            Shot::new("passing_shot_r", 0.95, 0.8, 0.5, 0.25, Baseline),
            Shot::new("deep_baseline", 0.5, 0.98, 0.85, 0.02, Baseline),
            Shot::new("wide_forehand", 0.95, 0.75, 0.75, 0.12, Baseline),
            Shot::new("wide_backhand", 0.05, 0.75, 0.75, 0.12, Baseline),
            Shot::new("serve_t", 0.5, 0.45, 0.55, 0.07, Serve),
            Shot::new("serve_wide", 0.85, 0.45, 0.6, 0.06, Serve),
        ];
        Self { shots, fallback: 0 }
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn get(&self, name: &str) -> Option<&Shot> {
        self.shots.iter().find(|s| s.name == name)
    }

    pub fn by_category(&self, category: ShotCategory) -> Vec<&Shot> {
        self.shots.iter().filter(|s| s.category == category).collect()
    }

    /// Every shot except serves.
    pub fn rally_shots(&self) -> Vec<&Shot> {
        self.shots
            .iter()
            .filter(|s| s.category != ShotCategory::Serve)
            .collect()
    }

    /// Natural replies to a received shot. Empty for categories without one.
    pub fn response_set(&self, received: ShotCategory) -> Vec<&Shot> {
        let names = match received {
            ShotCategory::Net => NET_RESPONSES,
            ShotCategory::Approach => APPROACH_RESPONSES,
            ShotCategory::Baseline | ShotCategory::Serve => return Vec::new(),
        };
        names.iter().filter_map(|name| self.get(name)).collect()
    }

    /// A rally shot that always exists.
    pub fn fallback(&self) -> &Shot {
        &self.shots[self.fallback]
    }
}

impl Default for ShotCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<Shot>> for ShotCatalog {
    type Error = CatalogError;

    fn try_from(shots: Vec<Shot>) -> Result<Self, Self::Error> {
        Self::new(shots)
    }
}

fn check_unit(shot: &Shot, field: &'static str, value: f32) -> Result<(), CatalogError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CatalogError::OutOfRange {
            name: shot.name.clone(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let standard = ShotCatalog::standard();
        let rebuilt = ShotCatalog::new(standard.shots().to_vec()).unwrap();
        assert_eq!(rebuilt, standard);
        assert_eq!(standard.by_category(ShotCategory::Serve).len(), 2);
        assert!(standard
            .rally_shots()
            .iter()
            .all(|s| s.category != ShotCategory::Serve));
    }

    #[test]
    fn test_response_sets() {
        let catalog = ShotCatalog::standard();
        let names = |set: Vec<&Shot>| set.into_iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(
            names(catalog.response_set(ShotCategory::Net)),
            vec!["passing_shot_l", "passing_shot_r", "lob"]
        );
        assert_eq!(catalog.response_set(ShotCategory::Approach).len(), 4);
        assert!(catalog.response_set(ShotCategory::Baseline).is_empty());
    }

    #[test]
    fn test_serve_only_catalog_is_rejected() {
        let shots = vec![Shot::new("ace", 0.5, 0.5, 0.5, 0.5, ShotCategory::Serve)];
        assert_eq!(ShotCatalog::new(shots), Err(CatalogError::NoRallyShots));
    }

    #[test]
    fn test_out_of_range_shot_is_rejected() {
        let shots = vec![Shot::new("wild", 1.5, 0.5, 0.5, 0.1, ShotCategory::Baseline)];
        assert!(matches!(
            ShotCatalog::new(shots),
            Err(CatalogError::OutOfRange { field: "target_x", .. })
        ));
    }

    #[test]
    fn test_catalog_deserializes_from_list() {
        let json = r#"[{"name":"slice","target_x":0.4,"depth":0.6,"speed":0.9,"winner_chance":0.1,"category":"baseline"}]"#;
        let catalog: ShotCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.fallback().name, "slice");
    }
}
