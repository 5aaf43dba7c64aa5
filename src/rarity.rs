//! Rarity scoring for a single domain.
//!
//! Five factors are computed as fractions in `[0, 1]`, combined with
//! [`RarityWeights`] into a 0–100 total, and reported individually as
//! display integers with a short rationale. The total is always taken from
//! the fractional sum, never from the rounded display values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DomainError, Result};
use crate::name::{DomainName, LabelPattern};
use crate::types::{DomainRecord, FactorScore, ScoreBreakdown};

/// Labels at or below this length get the full length factor.
pub const MIN_LABEL_LEN: usize = 3;
/// Labels at or above this length get a zero length factor.
pub const MAX_LABEL_LEN: usize = 23;
/// Age horizon for the expiration factor.
pub const AGE_HORIZON_DAYS: i64 = 365;

const WEIGHT_TOLERANCE: f64 = 1e-6;
/// Decimal places kept when weights and factors leave `f64`.
const FACTOR_DP: u32 = 9;

/// Relative weight of each rarity factor. Must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub length: f64,
    pub pattern: f64,
    pub tld: f64,
    pub activity: f64,
    pub expiration: f64,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            length: 0.25,
            pattern: 0.20,
            tld: 0.20,
            activity: 0.25,
            expiration: 0.10,
        }
    }
}

impl RarityWeights {
    pub fn total(&self) -> f64 {
        self.length + self.pattern + self.tld + self.activity + self.expiration
    }

    pub fn validate(&self) -> Result<()> {
        validate_weights(
            "rarity",
            &[
                self.length,
                self.pattern,
                self.tld,
                self.activity,
                self.expiration,
            ],
        )
    }
}

/// Shared check for weight sets: non-negative, finite, summing to 1.
pub(crate) fn validate_weights(kind: &str, weights: &[f64]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(DomainError::InvalidConfig(format!(
            "{kind} weights must be finite and non-negative"
        )));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(DomainError::InvalidConfig(format!(
            "{kind} weights must sum to 1, got {total}"
        )));
    }
    Ok(())
}

/// Default TLD rarity table, keyed by TLD with its leading dot.
pub fn default_tld_values() -> BTreeMap<String, f64> {
    let tiers: [(&[&str], f64); 4] = [
        (&[".ai", ".io", ".eth", ".crypto"], 1.0),
        (&[".com", ".net", ".org", ".xyz"], 0.8),
        (&[".sol", ".app", ".dev", ".nft"], 0.6),
        (&[".info", ".biz", ".online", ".site"], 0.4),
    ];
    tiers
        .iter()
        .flat_map(|(tlds, value)| tlds.iter().map(move |t| (t.to_string(), *value)))
        .collect()
}

fn default_unknown_tld_value() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityConfig {
    #[serde(default)]
    pub weights: RarityWeights,
    /// TLD (with leading dot, lowercase) → factor in `[0, 1]`.
    #[serde(default = "default_tld_values")]
    pub tld_values: BTreeMap<String, f64>,
    #[serde(default = "default_unknown_tld_value")]
    pub unknown_tld_value: f64,
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self {
            weights: RarityWeights::default(),
            tld_values: default_tld_values(),
            unknown_tld_value: default_unknown_tld_value(),
        }
    }
}

impl RarityConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        for (tld, value) in &self.tld_values {
            if !tld.starts_with('.') || tld.to_lowercase() != *tld {
                return Err(DomainError::InvalidConfig(format!(
                    "TLD key {tld:?} must be lowercase and start with '.'"
                )));
            }
            if !(0.0..=1.0).contains(value) {
                return Err(DomainError::InvalidConfig(format!(
                    "TLD value for {tld} must be within [0, 1], got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.unknown_tld_value) {
            return Err(DomainError::InvalidConfig(format!(
                "unknown_tld_value must be within [0, 1], got {}",
                self.unknown_tld_value
            )));
        }
        Ok(())
    }

    /// Rarity factor of a TLD, `None` when it is not in the table.
    pub fn tld_value(&self, tld: &str) -> Option<f64> {
        self.tld_values.get(tld).copied()
    }
}

/// Fractional (0–1) value of each factor, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityFactors {
    pub length: f64,
    pub pattern: f64,
    pub tld: f64,
    pub activity: f64,
    pub expiration: f64,
}

impl RarityFactors {
    /// Weighted sum scaled to 0–100, rounded and clamped.
    pub fn total(&self, weights: &RarityWeights) -> u8 {
        weighted_score(
            &[
                (weights.length, self.length),
                (weights.pattern, self.pattern),
                (weights.tld, self.tld),
                (weights.activity, self.activity),
                (weights.expiration, self.expiration),
            ],
            Decimal::ONE_HUNDRED,
        )
    }
}

fn to_decimal(x: f64) -> Decimal {
    Decimal::from_f64_retain(x)
        .unwrap_or_default()
        .round_dp(FACTOR_DP)
}

/// `scale × Σ weight·value` rounded half away from zero into `[0, 100]`.
///
/// The sum is taken in decimal so that exact half points such as 56.5 are
/// not pulled down by binary representation error.
pub(crate) fn weighted_score(terms: &[(f64, f64)], scale: Decimal) -> u8 {
    let sum: Decimal = terms
        .iter()
        .map(|&(weight, value)| to_decimal(weight) * to_decimal(value))
        .sum();
    (sum * scale)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .to_u8()
        .unwrap_or(0)
}

/// Scale a fraction to an integer in `[0, 100]`.
fn to_display(fraction: f64) -> u8 {
    weighted_score(&[(1.0, fraction)], Decimal::ONE_HUNDRED)
}

pub fn length_factor(len: usize) -> f64 {
    let span = (MAX_LABEL_LEN - MIN_LABEL_LEN) as f64;
    (1.0 - (len as f64 - MIN_LABEL_LEN as f64) / span).clamp(0.0, 1.0)
}

pub fn pattern_factor(pattern: LabelPattern) -> f64 {
    match pattern {
        LabelPattern::Letters | LabelPattern::Digits => 1.0,
        LabelPattern::Alphanumeric => 0.8,
        LabelPattern::Hyphenated => 0.6,
        LabelPattern::Other => 0.3,
    }
}

pub fn activity_factor(events: u64) -> f64 {
    match events {
        10.. => 1.0,
        3.. => 0.7,
        1.. => 0.4,
        0 => 0.2,
    }
}

/// `None` when the domain has no timestamp; scores as the oldest tier.
pub fn expiration_factor(entered_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match entered_at {
        Some(at) => {
            let days = (now - at).num_days();
            ((AGE_HORIZON_DAYS - days) as f64 / AGE_HORIZON_DAYS as f64).clamp(0.0, 1.0)
        }
        None => 0.0,
    }
}

fn length_description(len: usize) -> &'static str {
    match len {
        0..=4 => "Very short — highly valuable",
        5..=7 => "Short — valuable",
        8..=12 => "Medium length",
        _ => "Long name",
    }
}

fn pattern_description(pattern: LabelPattern) -> &'static str {
    match pattern {
        LabelPattern::Letters => "Pure letters",
        LabelPattern::Digits => "Pure numbers",
        LabelPattern::Alphanumeric => "Alphanumeric mix",
        LabelPattern::Hyphenated => "Contains hyphens",
        LabelPattern::Other => "Contains special characters",
    }
}

fn tld_description(value: Option<f64>) -> &'static str {
    match value {
        None => "Unrecognized TLD",
        Some(v) if v >= 1.0 => "Premium TLD",
        Some(v) if v >= 0.8 => "Common TLD",
        Some(v) if v >= 0.6 => "New TLD",
        Some(_) => "Generic TLD",
    }
}

fn activity_description(events: u64) -> &'static str {
    match events {
        10.. => "Highly traded",
        3.. => "Actively traded",
        1.. => "Some trading activity",
        0 => "No trading history",
    }
}

fn expiration_description(entered_at: Option<DateTime<Utc>>, factor: f64) -> &'static str {
    if entered_at.is_none() {
        "Tokenization date unknown"
    } else if factor >= 0.75 {
        "Recently tokenized"
    } else if factor > 0.0 {
        "Tokenized within the last year"
    } else {
        "Tokenized over a year ago"
    }
}

/// Scores single domains against a validated [`RarityConfig`].
#[derive(Debug, Clone, Default)]
pub struct RarityScorer {
    config: RarityConfig,
}

impl RarityScorer {
    pub fn new(config: RarityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RarityConfig {
        &self.config
    }

    /// Score `domain` as of now.
    pub fn score(&self, domain: &DomainRecord) -> Result<ScoreBreakdown> {
        self.score_at(domain, Utc::now())
    }

    /// Score `domain` with its age measured at `now`.
    pub fn score_at(&self, domain: &DomainRecord, now: DateTime<Utc>) -> Result<ScoreBreakdown> {
        let name = domain.domain_name()?;
        Ok(self.score_name_at(&name, domain, now))
    }

    /// Score an already validated name; `domain` supplies the statistics.
    pub(crate) fn score_name_at(
        &self,
        name: &DomainName,
        domain: &DomainRecord,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let len = name.label_len();
        let pattern = name.pattern();
        let tld_value = self.config.tld_value(name.tld());
        let events = domain.trade_events();
        let entered_at = domain.entered_at();

        let factors = RarityFactors {
            length: length_factor(len),
            pattern: pattern_factor(pattern),
            tld: tld_value.unwrap_or(self.config.unknown_tld_value),
            activity: activity_factor(events),
            expiration: expiration_factor(entered_at, now),
        };
        let total_score = factors.total(&self.config.weights);
        debug!(domain = %name, total_score, "scored domain");

        ScoreBreakdown {
            name: name.to_string(),
            total_score,
            length: FactorScore {
                score: to_display(factors.length),
                description: length_description(len),
            },
            pattern: FactorScore {
                score: to_display(factors.pattern),
                description: pattern_description(pattern),
            },
            tld: FactorScore {
                score: to_display(factors.tld),
                description: tld_description(tld_value),
            },
            activity: FactorScore {
                score: to_display(factors.activity),
                description: activity_description(events),
            },
            expiration: FactorScore {
                score: to_display(factors.expiration),
                description: expiration_description(entered_at, factors.expiration),
            },
        }
    }
}

/// Score `domain` with the default configuration.
pub fn score(domain: &DomainRecord) -> Result<ScoreBreakdown> {
    RarityScorer::default().score(domain)
}
