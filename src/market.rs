use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::types::{DomainRecord, MarketSummary};
use crate::units::to_canonical_units;

/// Aggregate listing prices, offers, and activity over a set of domains.
///
/// Listing prices that fail canonical conversion are left out of the price
/// statistics but the domain still counts toward the totals.
pub fn summarize(domains: &[DomainRecord]) -> MarketSummary {
    let mut prices: Vec<Decimal> = domains
        .iter()
        .filter_map(|d| {
            let raw = d.listing_price.as_deref()?;
            match to_canonical_units(raw) {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!("{}: {e}, excluded from price statistics", d.name);
                    None
                }
            }
        })
        .collect();
    prices.sort();

    let total_offers = domains.iter().map(|d| d.active_offers_count).sum();
    let total_activity = domains.iter().map(|d| d.activity_count.unwrap_or(0)).sum();

    let average_price = if prices.is_empty() {
        None
    } else {
        let sum: Decimal = prices.iter().sum();
        Some((sum / Decimal::from(prices.len())).normalize())
    };

    debug!(
        "Summarized {} domains, {} listed",
        domains.len(),
        prices.len()
    );

    MarketSummary {
        domain_count: domains.len(),
        listed_count: prices.len(),
        floor_price: prices.first().copied(),
        average_price,
        median_price: median(&prices),
        total_offers,
        total_activity,
    }
}

/// Median of an already sorted slice.
fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let value = if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    };
    Some(value.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn listed(name: &str, wei: &str, offers: u64, activity: Option<u64>) -> DomainRecord {
        DomainRecord {
            listing_price: Some(wei.to_string()),
            active_offers_count: offers,
            activity_count: activity,
            ..DomainRecord::new(name)
        }
    }

    #[test]
    fn empty_set() {
        let s = summarize(&[]);
        assert_eq!(s.domain_count, 0);
        assert_eq!(s.listed_count, 0);
        assert_eq!(s.floor_price, None);
        assert_eq!(s.average_price, None);
        assert_eq!(s.median_price, None);
        assert_eq!(s.total_offers, 0);
    }

    #[test]
    fn odd_number_of_listings() {
        let domains = vec![
            listed("a.com", "300000000000000000", 1, Some(4)),
            listed("b.com", "100000000000000000", 2, None),
            listed("c.com", "2000000000000000000", 0, Some(1)),
            DomainRecord::new("unlisted.com"),
        ];
        let s = summarize(&domains);
        assert_eq!(s.domain_count, 4);
        assert_eq!(s.listed_count, 3);
        assert_eq!(s.floor_price, Some(dec!(0.1)));
        assert_eq!(s.median_price, Some(dec!(0.3)));
        assert_eq!(s.average_price, Some(dec!(0.8)));
        assert_eq!(s.total_offers, 3);
        assert_eq!(s.total_activity, 5);
    }

    #[test]
    fn even_number_of_listings_averages_middle() {
        let domains = vec![
            listed("a.com", "100000000000000000", 0, None),
            listed("b.com", "400000000000000000", 0, None),
        ];
        let s = summarize(&domains);
        assert_eq!(s.median_price, Some(dec!(0.25)));
        assert_eq!(s.average_price, Some(dec!(0.25)));
    }

    #[test]
    fn bad_prices_are_excluded() {
        let domains = vec![
            listed("a.com", "oops", 1, None),
            listed("b.com", "500000000000000000", 0, None),
        ];
        let s = summarize(&domains);
        assert_eq!(s.listed_count, 1);
        assert_eq!(s.floor_price, Some(dec!(0.5)));
        assert_eq!(s.total_offers, 1);
    }
}
