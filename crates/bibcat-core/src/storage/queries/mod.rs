mod stats;

pub use stats::{CatalogStats, CatalogStatsQuery};
