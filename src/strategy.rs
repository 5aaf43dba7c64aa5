//! Candidate pre-filter stage of the trending pipeline.
//!
//! A [`CandidateFilter`] picks which domains are scored at all. It never
//! touches scores, so swapping filters cannot change how two domains that
//! both pass compare to each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DomainError, Result};
use crate::types::DomainRecord;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_RECENT_RATIO: f64 = 0.7;

/// Selects the candidate pool handed to the ranker.
pub trait CandidateFilter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the selected candidates in input order.
    fn select<'a>(
        &self,
        candidates: &'a [DomainRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a DomainRecord>;
}

/// `true` when the domain entered the system at most `window_days` ago.
/// Future timestamps count as recent; undated domains never do.
pub fn is_recent(domain: &DomainRecord, window_days: i64, now: DateTime<Utc>) -> bool {
    domain
        .entered_at()
        .is_some_and(|at| (now - at).num_days() <= window_days)
}

/// Keeps every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl CandidateFilter for PassThrough {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn select<'a>(
        &self,
        candidates: &'a [DomainRecord],
        _now: DateTime<Utc>,
    ) -> Vec<&'a DomainRecord> {
        candidates.iter().collect()
    }
}

/// Keeps only domains tokenized within the window.
#[derive(Debug, Clone, Copy)]
pub struct RecencyWindow {
    pub window_days: i64,
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl CandidateFilter for RecencyWindow {
    fn name(&self) -> &'static str {
        "recency_window"
    }

    fn select<'a>(
        &self,
        candidates: &'a [DomainRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a DomainRecord> {
        let selected: Vec<_> = candidates
            .iter()
            .filter(|d| is_recent(d, self.window_days, now))
            .collect();
        debug!(
            window_days = self.window_days,
            "recency window kept {}/{} candidates",
            selected.len(),
            candidates.len()
        );
        selected
    }
}

/// Every recent domain plus a slice of older ones, sized so that recent
/// domains make up `recent_ratio` of the pool.
///
/// Older domains are taken in input order. When nothing is recent the
/// whole older set is kept so the ranking is never empty for lack of
/// fresh listings.
#[derive(Debug, Clone, Copy)]
pub struct RecentMix {
    window_days: i64,
    recent_ratio: f64,
}

impl Default for RecentMix {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            recent_ratio: DEFAULT_RECENT_RATIO,
        }
    }
}

impl RecentMix {
    /// Fails for a negative window or a ratio outside `[0, 1]` (NaN included).
    pub fn new(window_days: i64, recent_ratio: f64) -> Result<Self> {
        check_window(window_days)?;
        check_ratio(recent_ratio)?;
        Ok(Self {
            window_days,
            recent_ratio,
        })
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    pub fn recent_ratio(&self) -> f64 {
        self.recent_ratio
    }

    /// Number of older domains to add next to `recent` recent ones.
    fn older_quota(&self, recent: usize, available: usize) -> usize {
        if recent == 0 {
            return available;
        }
        if self.recent_ratio >= 1.0 {
            return 0;
        }
        if self.recent_ratio <= 0.0 {
            return available;
        }
        let quota = (recent as f64 * (1.0 - self.recent_ratio) / self.recent_ratio).round();
        (quota as usize).min(available)
    }
}

impl CandidateFilter for RecentMix {
    fn name(&self) -> &'static str {
        "recent_mix"
    }

    fn select<'a>(
        &self,
        candidates: &'a [DomainRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a DomainRecord> {
        let recent = candidates
            .iter()
            .filter(|d| is_recent(d, self.window_days, now))
            .count();
        let older_quota = self.older_quota(recent, candidates.len() - recent);

        let mut older_taken = 0;
        let selected: Vec<_> = candidates
            .iter()
            .filter(|d| {
                if is_recent(d, self.window_days, now) {
                    true
                } else if older_taken < older_quota {
                    older_taken += 1;
                    true
                } else {
                    false
                }
            })
            .collect();
        debug!(
            recent,
            older = older_taken,
            "recent mix kept {}/{} candidates",
            selected.len(),
            candidates.len()
        );
        selected
    }
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_recent_ratio() -> f64 {
    DEFAULT_RECENT_RATIO
}

/// Serializable choice of pre-filter, as it appears in `config.toml`:
///
/// ```toml
/// [trending.strategy]
/// kind = "recent_mix"
/// window_days = 14
/// recent_ratio = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    #[default]
    Simple,
    RecencyWindow {
        #[serde(default = "default_window_days")]
        window_days: i64,
    },
    RecentMix {
        #[serde(default = "default_window_days")]
        window_days: i64,
        #[serde(default = "default_recent_ratio")]
        recent_ratio: f64,
    },
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Simple => Ok(()),
            Self::RecencyWindow { window_days } => check_window(window_days),
            Self::RecentMix {
                window_days,
                recent_ratio,
            } => {
                check_window(window_days)?;
                check_ratio(recent_ratio)
            }
        }
    }

    pub fn build(&self) -> Result<Box<dyn CandidateFilter>> {
        self.validate()?;
        Ok(match *self {
            Self::Simple => Box::new(PassThrough),
            Self::RecencyWindow { window_days } => Box::new(RecencyWindow { window_days }),
            Self::RecentMix {
                window_days,
                recent_ratio,
            } => Box::new(RecentMix::new(window_days, recent_ratio)?),
        })
    }
}

fn check_window(window_days: i64) -> Result<()> {
    if window_days < 0 {
        return Err(DomainError::InvalidConfig(format!(
            "window_days must be non-negative, got {window_days}"
        )));
    }
    Ok(())
}

fn check_ratio(recent_ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&recent_ratio) {
        return Err(DomainError::InvalidConfig(format!(
            "recent_ratio must be within [0, 1], got {recent_ratio}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn aged(name: &str, days: i64) -> DomainRecord {
        DomainRecord {
            tokenized_at: Some(now() - Duration::days(days)),
            ..DomainRecord::new(name)
        }
    }

    fn names(selected: &[&DomainRecord]) -> Vec<String> {
        selected.iter().map(|d| d.name.clone()).collect()
    }

    #[test]
    fn recency_uses_created_at_fallback() {
        let d = DomainRecord {
            created_at: Some(now() - Duration::days(3)),
            ..DomainRecord::new("a.com")
        };
        assert!(is_recent(&d, 30, now()));
        assert!(!is_recent(&DomainRecord::new("b.com"), 30, now()));
        assert!(is_recent(&aged("c.com", -5), 30, now()));
        assert!(is_recent(&aged("d.com", 30), 30, now()));
        assert!(!is_recent(&aged("e.com", 31), 30, now()));
    }

    #[test]
    fn pass_through_keeps_all() {
        let all = vec![aged("a.com", 1), DomainRecord::new("b.com")];
        assert_eq!(PassThrough.select(&all, now()).len(), 2);
    }

    #[test]
    fn recency_window_drops_old_and_undated() {
        let all = vec![
            aged("old.com", 90),
            aged("new.com", 2),
            DomainRecord::new("undated.com"),
            aged("edge.com", 30),
        ];
        let kept = RecencyWindow::default().select(&all, now());
        assert_eq!(names(&kept), vec!["new.com", "edge.com"]);
    }

    #[test]
    fn recent_mix_adds_proportional_older_slice() {
        // 7 recent at ratio 0.7 → 3 older
        let mut all: Vec<DomainRecord> = (0..5).map(|i| aged(&format!("old{i}.com"), 100)).collect();
        all.extend((0..7).map(|i| aged(&format!("new{i}.com"), 1)));
        let kept = RecentMix::default().select(&all, now());
        assert_eq!(kept.len(), 10);
        assert_eq!(names(&kept)[..3], ["old0.com", "old1.com", "old2.com"]);
    }

    #[test]
    fn recent_mix_without_recent_keeps_older() {
        let all = vec![aged("a.com", 100), aged("b.com", 200)];
        assert_eq!(RecentMix::default().select(&all, now()).len(), 2);
    }

    #[test]
    fn recent_mix_ratio_one_is_window_only() {
        let all = vec![aged("a.com", 100), aged("b.com", 1)];
        let mix = RecentMix::new(30, 1.0).unwrap();
        assert_eq!(names(&mix.select(&all, now())), vec!["b.com"]);
    }

    #[test]
    fn recent_mix_new_rejects_bad_values() {
        assert!(RecentMix::new(30, f64::NAN).is_err());
        assert!(RecentMix::new(30, -0.1).is_err());
        assert!(RecentMix::new(30, 1.01).is_err());
        assert!(RecentMix::new(-1, 0.5).is_err());

        let mix = RecentMix::new(0, 0.0).unwrap();
        assert_eq!(mix.window_days(), 0);
        assert_eq!(mix.recent_ratio(), 0.0);
    }

    #[test]
    fn config_rejects_nan_ratio() {
        let cfg = StrategyConfig::RecentMix {
            window_days: 30,
            recent_ratio: f64::NAN,
        };
        assert!(cfg.validate().is_err());
        assert!(cfg.build().is_err());
    }

    #[test]
    fn config_builds_named_filters() {
        assert_eq!(StrategyConfig::Simple.build().unwrap().name(), "simple");
        let cfg = StrategyConfig::RecentMix {
            window_days: 7,
            recent_ratio: 0.5,
        };
        assert_eq!(cfg.build().unwrap().name(), "recent_mix");
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(StrategyConfig::RecencyWindow { window_days: -1 }.build().is_err());
        let cfg = StrategyConfig::RecentMix {
            window_days: 30,
            recent_ratio: 1.5,
        };
        assert!(cfg.build().is_err());
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: StrategyConfig = toml::from_str("kind = \"recency_window\"").unwrap();
        assert_eq!(cfg, StrategyConfig::RecencyWindow { window_days: 30 });

        let cfg: StrategyConfig =
            toml::from_str("kind = \"recent_mix\"\nrecent_ratio = 0.5").unwrap();
        assert_eq!(
            cfg,
            StrategyConfig::RecentMix {
                window_days: 30,
                recent_ratio: 0.5
            }
        );
    }
}
