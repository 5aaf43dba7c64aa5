//! Trending ranking over a candidate set of domains.
//!
//! Each candidate gets four 0–100 sub-scores (price, activity, offers, name
//! characteristics) combined with [`RankWeights`]. The result is sorted by
//! trending score, then activity count, then offer count, all descending;
//! remaining ties keep input order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DomainError, Result};
use crate::name::DomainName;
use crate::rarity::{validate_weights, weighted_score};
use crate::strategy::{CandidateFilter, RecentMix, StrategyConfig};
use crate::types::{DomainRecord, RankedDomain};
use crate::units::to_canonical_units;

/// Floor of every tiered sub-score.
const BASE_TIER: u8 = 20;
/// Starting point of the characteristics score.
const CHARACTERISTICS_BASE: u32 = 50;
const ALTERNATING_BONUS: u32 = 10;
const KNOWN_TERM_BONUS: u32 = 15;
/// Largest accepted characteristics bonus for a single TLD.
pub const MAX_TLD_BONUS: u32 = 100;
/// Known-term bonus used by the unlisted price estimate.
const KNOWN_TERM_PRICE_BONUS: u32 = 20;

/// Relative weight of each trending sub-score. Must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    pub price: f64,
    pub activity: f64,
    pub offers: f64,
    pub characteristics: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            price: 0.2,
            activity: 0.2,
            offers: 0.2,
            characteristics: 0.4,
        }
    }
}

impl RankWeights {
    /// Weights that lean on the name itself over market signals.
    pub fn characteristics_heavy() -> Self {
        Self {
            price: 0.15,
            activity: 0.15,
            offers: 0.15,
            characteristics: 0.55,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_weights(
            "trending",
            &[self.price, self.activity, self.offers, self.characteristics],
        )
    }
}

/// Characteristics bonus per TLD, keyed with the leading dot.
pub fn default_tld_bonuses() -> BTreeMap<String, u32> {
    [
        (".ai", 20),
        (".io", 15),
        (".eth", 15),
        (".com", 15),
        (".xyz", 10),
        (".app", 10),
        (".sol", 10),
        (".net", 5),
        (".org", 5),
    ]
    .into_iter()
    .map(|(tld, bonus)| (tld.to_string(), bonus))
    .collect()
}

/// Short labels that earn the known-term bonus on an exact match.
pub fn default_known_terms() -> Vec<String> {
    [
        "ai", "app", "bank", "bet", "btc", "crypto", "dao", "defi", "dex", "eth", "game",
        "meta", "nft", "pay", "swap", "web3",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(default)]
    pub weights: RankWeights,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default = "default_tld_bonuses")]
    pub tld_bonuses: BTreeMap<String, u32>,
    #[serde(default = "default_known_terms")]
    pub known_terms: Vec<String>,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            weights: RankWeights::default(),
            strategy: StrategyConfig::default(),
            tld_bonuses: default_tld_bonuses(),
            known_terms: default_known_terms(),
        }
    }
}

/// Named ranking behaviours sharing one scoring algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPreset {
    /// Every candidate, default weights.
    Simple,
    /// Recent domains plus an older slice, default weights.
    RecencyWeighted,
    /// Every candidate, weighted toward name characteristics.
    CharacteristicsWeighted,
}

impl RankConfig {
    pub fn preset(preset: RankingPreset) -> Self {
        match preset {
            RankingPreset::Simple => Self::default(),
            RankingPreset::RecencyWeighted => {
                let mix = RecentMix::default();
                Self {
                    strategy: StrategyConfig::RecentMix {
                        window_days: mix.window_days(),
                        recent_ratio: mix.recent_ratio(),
                    },
                    ..Self::default()
                }
            }
            RankingPreset::CharacteristicsWeighted => Self {
                weights: RankWeights::characteristics_heavy(),
                ..Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.strategy.validate()?;
        if let Some(tld) = self
            .tld_bonuses
            .keys()
            .find(|t| !t.starts_with('.') || t.to_lowercase() != **t)
        {
            return Err(DomainError::InvalidConfig(format!(
                "TLD key {tld:?} must be lowercase and start with '.'"
            )));
        }
        if let Some((tld, bonus)) = self
            .tld_bonuses
            .iter()
            .find(|(_, b)| **b > MAX_TLD_BONUS)
        {
            return Err(DomainError::InvalidConfig(format!(
                "TLD bonus for {tld} must be at most {MAX_TLD_BONUS}, got {bonus}"
            )));
        }
        Ok(())
    }

    /// Configured bonus for `tld`, capped at [`MAX_TLD_BONUS`].
    fn tld_bonus(&self, tld: &str) -> u32 {
        self.tld_bonuses
            .get(tld)
            .copied()
            .unwrap_or(0)
            .min(MAX_TLD_BONUS)
    }
}

/// The four sub-scores of one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendingScores {
    pub price: u8,
    pub activity: u8,
    pub offers: u8,
    pub characteristics: u8,
}

impl TrendingScores {
    pub fn total(&self, weights: &RankWeights) -> u8 {
        weighted_score(
            &[
                (weights.price, f64::from(self.price)),
                (weights.activity, f64::from(self.activity)),
                (weights.offers, f64::from(self.offers)),
                (weights.characteristics, f64::from(self.characteristics)),
            ],
            Decimal::ONE,
        )
    }
}

/// Bucket a listing price in canonical units.
pub fn price_tier(price: Decimal) -> u8 {
    if price >= dec!(0.5) {
        100
    } else if price >= dec!(0.1) {
        80
    } else if price >= dec!(0.05) {
        60
    } else if price >= dec!(0.01) {
        40
    } else {
        BASE_TIER
    }
}

/// Name-derived stand-in for the price score of an unlisted domain.
pub fn estimated_price_score(name: &DomainName, config: &RankConfig) -> u8 {
    let length_bonus = match name.label_len() {
        0..=3 => 40,
        4..=5 => 30,
        6..=7 => 20,
        8..=10 => 10,
        _ => 0,
    };
    let tld_bonus = match config.tld_bonus(name.tld()) {
        15.. => 20,
        5.. => 10,
        _ => 0,
    };
    let term_bonus = if name.matches_term(&config.known_terms) {
        KNOWN_TERM_PRICE_BONUS
    } else {
        0
    };
    (u32::from(BASE_TIER) + length_bonus + tld_bonus + term_bonus).min(100) as u8
}

pub fn price_score(domain: &DomainRecord, name: &DomainName, config: &RankConfig) -> u8 {
    let Some(raw) = domain.listing_price.as_deref() else {
        return estimated_price_score(name, config);
    };
    match to_canonical_units(raw) {
        Ok(price) => price_tier(price),
        Err(e) => {
            warn!("{name}: {e}, using estimated price score");
            estimated_price_score(name, config)
        }
    }
}

pub fn activity_score(activity_count: u64) -> u8 {
    match activity_count {
        10.. => 100,
        5.. => 80,
        3.. => 60,
        2 => 40,
        _ => BASE_TIER,
    }
}

pub fn offers_score(active_offers: u64) -> u8 {
    match active_offers {
        5.. => 100,
        3.. => 80,
        2 => 60,
        1 => 40,
        0 => BASE_TIER,
    }
}

pub fn characteristics_score(name: &DomainName, config: &RankConfig) -> u8 {
    let length_bonus = match name.label_len() {
        0..=3 => 30,
        4..=5 => 20,
        6..=7 => 10,
        _ => 0,
    };
    let pattern_bonus = if name.is_alternating() {
        ALTERNATING_BONUS
    } else {
        0
    };
    let term_bonus = if name.matches_term(&config.known_terms) {
        KNOWN_TERM_BONUS
    } else {
        0
    };
    let score = [length_bonus, config.tld_bonus(name.tld()), pattern_bonus, term_bonus]
        .into_iter()
        .fold(CHARACTERISTICS_BASE, u32::saturating_add);
    score.min(100) as u8
}

pub fn compute_scores(
    domain: &DomainRecord,
    name: &DomainName,
    config: &RankConfig,
) -> TrendingScores {
    TrendingScores {
        price: price_score(domain, name, config),
        activity: activity_score(domain.activity_count.unwrap_or(0)),
        offers: offers_score(domain.active_offers_count),
        characteristics: characteristics_score(name, config),
    }
}

/// Total order used by the ranking: higher trending score first, then
/// higher activity count, then more active offers.
pub fn compare_ranked(a: &RankedDomain, b: &RankedDomain) -> Ordering {
    b.trending_score
        .cmp(&a.trending_score)
        .then_with(|| {
            b.domain
                .activity_count
                .unwrap_or(0)
                .cmp(&a.domain.activity_count.unwrap_or(0))
        })
        .then_with(|| {
            b.domain
                .active_offers_count
                .cmp(&a.domain.active_offers_count)
        })
}

/// Ranks candidate sets with a fixed config and pre-filter.
pub struct TrendingRanker {
    config: RankConfig,
    filter: Box<dyn CandidateFilter>,
}

impl TrendingRanker {
    /// Build a ranker whose pre-filter comes from `config.strategy`.
    pub fn new(config: RankConfig) -> Result<Self> {
        config.validate()?;
        let filter = config.strategy.build()?;
        Ok(Self { config, filter })
    }

    /// Build a ranker with a caller-supplied pre-filter; `config.strategy`
    /// is ignored.
    pub fn with_filter(config: RankConfig, filter: Box<dyn CandidateFilter>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    pub fn filter_name(&self) -> &'static str {
        self.filter.name()
    }

    /// Rank `domains` as of now.
    pub fn rank_now(&self, domains: &[DomainRecord], limit: usize) -> Vec<RankedDomain> {
        self.rank(domains, limit, Utc::now())
    }

    /// Return at most `limit` domains in ranking order. Candidates with an
    /// invalid name are skipped.
    pub fn rank(
        &self,
        domains: &[DomainRecord],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<RankedDomain> {
        if limit == 0 {
            return Vec::new();
        }

        let candidates = self.filter.select(domains, now);
        let mut ranked: Vec<RankedDomain> = candidates
            .into_iter()
            .filter_map(|domain| {
                let name = match domain.domain_name() {
                    Ok(name) => name,
                    Err(e) => {
                        warn!("Skipping candidate: {e}");
                        return None;
                    }
                };
                let scores = compute_scores(domain, &name, &self.config);
                Some(RankedDomain {
                    rank: 0,
                    domain: domain.clone(),
                    trending_score: scores.total(&self.config.weights),
                    price_score: scores.price,
                    activity_score: scores.activity,
                    offers_score: scores.offers,
                    characteristics_score: scores.characteristics,
                })
            })
            .collect();

        // sort_by is stable: residual ties keep input order
        ranked.sort_by(compare_ranked);
        ranked.truncate(limit);
        for (i, r) in ranked.iter_mut().enumerate() {
            r.rank = i + 1;
        }

        debug!(
            strategy = self.filter.name(),
            "Ranked {} of {} domains (limit {limit})",
            ranked.len(),
            domains.len()
        );
        ranked
    }
}

/// Rank `domains` with `config` at instant `now`.
pub fn rank(
    domains: &[DomainRecord],
    limit: usize,
    config: &RankConfig,
    now: DateTime<Utc>,
) -> Result<Vec<RankedDomain>> {
    Ok(TrendingRanker::new(config.clone())?.rank(domains, limit, now))
}
