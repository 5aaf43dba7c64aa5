use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::name::DomainName;
use crate::rarity::RarityScorer;
use crate::types::{DomainRecord, Recommendation};

const SAME_TLD: u8 = 40;
const CLOSE_LENGTH: u8 = 30;
const NEAR_LENGTH: u8 = 15;
const SAME_PATTERN: u8 = 20;
const SHARED_PREFIX: u8 = 10;
const PREFIX_LEN: usize = 3;

/// Similarity of `candidate` to `target` in 0–100, with the reasons behind it.
pub fn similarity(target: &DomainName, candidate: &DomainName) -> (u8, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    if target.tld() == candidate.tld() {
        score += SAME_TLD;
        reasons.push(format!("Same TLD ({})", candidate.tld()));
    }

    match target.label_len().abs_diff(candidate.label_len()) {
        0..=1 => {
            score += CLOSE_LENGTH;
            reasons.push("Similar length".to_string());
        }
        2..=3 => {
            score += NEAR_LENGTH;
            reasons.push("Comparable length".to_string());
        }
        _ => {}
    }

    if target.pattern() == candidate.pattern() {
        score += SAME_PATTERN;
        reasons.push("Same character pattern".to_string());
    }

    if let (Some(a), Some(b)) = (prefix(target.label()), prefix(candidate.label())) {
        if a == b {
            score += SHARED_PREFIX;
            reasons.push(format!("Shares prefix \"{a}\""));
        }
    }

    (score, reasons)
}

fn prefix(label: &str) -> Option<String> {
    let p: String = label.chars().take(PREFIX_LEN).collect::<String>().to_lowercase();
    (p.chars().count() == PREFIX_LEN).then_some(p)
}

/// Suggest up to `limit` candidates similar to `target`.
///
/// Ordered by similarity, then rarity score, both descending; remaining ties
/// keep input order. The target itself and candidates with nothing in common
/// are left out. Fails only when the target name is invalid.
pub fn recommend(
    target: &DomainRecord,
    candidates: &[DomainRecord],
    limit: usize,
    scorer: &RarityScorer,
    now: DateTime<Utc>,
) -> Result<Vec<Recommendation>> {
    let target_name = target.domain_name()?;

    let mut picks: Vec<Recommendation> = candidates
        .iter()
        .filter(|c| !c.name.eq_ignore_ascii_case(&target.name))
        .filter_map(|c| {
            let name = match c.domain_name() {
                Ok(name) => name,
                Err(e) => {
                    warn!("Skipping candidate: {e}");
                    return None;
                }
            };
            let (similarity, reasons) = similarity(&target_name, &name);
            if similarity == 0 {
                return None;
            }
            let rarity = scorer.score_name_at(&name, c, now);
            Some(Recommendation {
                domain: c.clone(),
                rarity_score: rarity.total_score,
                similarity,
                reasons,
            })
        })
        .collect();

    picks.sort_by(|a, b| {
        b.similarity
            .cmp(&a.similarity)
            .then_with(|| b.rarity_score.cmp(&a.rarity_score))
    });
    picks.truncate(limit);

    debug!("{} recommendations for {target_name}", picks.len());
    Ok(picks)
}
