pub mod config;
pub mod error;
pub mod market;
pub mod name;
pub mod rarity;
pub mod recommend;
pub mod reporter;
pub mod strategy;
pub mod trending;
pub mod types;
pub mod units;

pub use error::DomainError;
pub use rarity::{RarityScorer, score};
pub use trending::{RankConfig, TrendingRanker, rank};
pub use types::{DomainRecord, RankedDomain, ScoreBreakdown};
pub use units::to_canonical_units;
