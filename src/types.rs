use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::name::DomainName;

/// A tokenized domain as returned by the indexing API.
///
/// Only `name` is required; every statistic may be missing and falls into
/// the lowest tier of the factor that reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenized_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_offers_count: u64,
    /// Integer amount in the smallest currency unit. `None` when unlisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_count: Option<u64>,
}

impl DomainRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse and validate `name`.
    pub fn domain_name(&self) -> Result<DomainName> {
        DomainName::parse(&self.name)
    }

    /// Instant the domain entered the tracked system: `tokenizedAt`,
    /// falling back to `createdAt`.
    pub fn entered_at(&self) -> Option<DateTime<Utc>> {
        self.tokenized_at.or(self.created_at)
    }

    /// `max(salesCount, activityCount)`, zero when neither is known.
    pub fn trade_events(&self) -> u64 {
        self.sales_count
            .unwrap_or(0)
            .max(self.activity_count.unwrap_or(0))
    }
}

/// One factor of a rarity score, scaled to 0–100 for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub score: u8,
    pub description: &'static str,
}

/// Result of scoring a single domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub name: String,
    pub total_score: u8,
    pub length: FactorScore,
    pub pattern: FactorScore,
    pub tld: FactorScore,
    pub activity: FactorScore,
    pub expiration: FactorScore,
}

/// A domain with its trending score and the sub-scores behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDomain {
    /// 1-based position in the ranking.
    pub rank: usize,
    #[serde(flatten)]
    pub domain: DomainRecord,
    pub trending_score: u8,
    pub price_score: u8,
    pub activity_score: u8,
    pub offers_score: u8,
    pub characteristics_score: u8,
}

/// Aggregate market statistics over a set of domains.
///
/// Prices are in canonical units and `None` when no domain is listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub domain_count: usize,
    pub listed_count: usize,
    pub floor_price: Option<Decimal>,
    pub average_price: Option<Decimal>,
    pub median_price: Option<Decimal>,
    pub total_offers: u64,
    pub total_activity: u64,
}

/// A domain suggested as similar to a queried one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub domain: DomainRecord,
    pub rarity_score: u8,
    pub similarity: u8,
    pub reasons: Vec<String>,
}
