use serde::Serialize;
use tracing::warn;

use crate::types::{MarketSummary, RankedDomain, Recommendation, ScoreBreakdown};

/// Emit any serializable result as pretty-printed JSON to stdout.
fn report<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!("Failed to serialize output: {e}"),
    }
}

pub fn report_score(breakdown: &ScoreBreakdown) {
    report(breakdown);
}

/// Emit a ranking as a JSON array.
pub fn report_ranking(ranked: &[RankedDomain]) {
    report(ranked);
}

pub fn report_summary(summary: &MarketSummary) {
    report(summary);
}

pub fn report_recommendations(recommendations: &[Recommendation]) {
    report(recommendations);
}

#[cfg(test)]
mod tests {
    use crate::types::{DomainRecord, FactorScore, RankedDomain, ScoreBreakdown};

    #[test]
    fn ranked_domain_serializes_flat_camel_case() {
        let ranked = RankedDomain {
            rank: 1,
            domain: DomainRecord {
                activity_count: Some(3),
                ..DomainRecord::new("ai.ai")
            },
            trending_score: 90,
            price_score: 100,
            activity_score: 60,
            offers_score: 20,
            characteristics_score: 100,
        };
        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["name"], "ai.ai");
        assert_eq!(value["activityCount"], 3);
        assert_eq!(value["activeOffersCount"], 0);
        assert_eq!(value["trendingScore"], 90);
        assert!(value.get("listingPrice").is_none());
    }

    #[test]
    fn breakdown_serializes_factor_details() {
        let factor = |score| FactorScore {
            score,
            description: "x",
        };
        let breakdown = ScoreBreakdown {
            name: "a.com".to_string(),
            total_score: 66,
            length: factor(100),
            pattern: factor(100),
            tld: factor(80),
            activity: factor(20),
            expiration: factor(0),
        };
        let value = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(value["totalScore"], 66);
        assert_eq!(value["tld"]["score"], 80);
        assert_eq!(value["tld"]["description"], "x");
    }
}
