pub mod config;
pub mod court;
pub mod selection;
pub mod shots;
pub mod simulator;

pub use config::{SimConfig, TennisConfig};
pub use court::Court;
pub use selection::ShotSelector;
pub use shots::{CatalogError, Shot, ShotCatalog, ShotCategory};
pub use simulator::TennisSimulator;
