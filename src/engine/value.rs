//! Value detection on decimal odds.
//!
//! For a claimed true probability `p` and decimal odds `o`:
//!   implied probability = 1 / o
//!   EV%                 = (p · o − 1) × 100
//!   expected return     = p · o · stake − (1 − p) · stake
//!
//! A bet has value when EV% is positive, i.e. when `p > 1 / o`. Call sites that
//! want a margin of safety pass an edge threshold in EV percentage points.
//!
//! Odds at or below zero are malformed and never assessed. Odds in (0, 1] are
//! non-physical: an assessment can still be produced with an implied
//! probability of zero, but batch evaluation and ranking exclude them.

use tracing::warn;

use super::types::{MarketQuote, ValueAssessment};

/// Convert decimal odds to implied probability. Returns 0 for odds ≤ 1.
pub fn implied_probability(odds: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }
    1.0 / odds
}

/// Percentage edge relative to stake.
pub fn expected_value_percent(true_probability: f64, odds: f64) -> f64 {
    (true_probability * odds - 1.0) * 100.0
}

/// Stake-weighted expectation under a binary win/lose model.
pub fn expected_return(true_probability: f64, odds: f64, stake: f64) -> f64 {
    true_probability * odds * stake - (1.0 - true_probability) * stake
}

/// When a positively priced market counts as a recommendation.
///
/// `edge_threshold` is in EV percentage points. `min_confidence` gates on
/// `max(p, 1 - p)` so coin-flip markets are not recommended on edge alone;
/// zero disables the gate. A bare `f64` converts to an edge-only criterion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValueCriteria {
    pub edge_threshold: f64,
    pub min_confidence: f64,
}

impl ValueCriteria {
    pub fn new(edge_threshold: f64, min_confidence: f64) -> Self {
        Self {
            edge_threshold,
            min_confidence,
        }
    }
}

impl From<f64> for ValueCriteria {
    fn from(edge_threshold: f64) -> Self {
        Self::new(edge_threshold, 0.0)
    }
}

/// Confidence in a binary market: the larger of `p` and `1 - p`.
pub fn confidence(true_probability: f64) -> f64 {
    true_probability.max(1.0 - true_probability)
}

/// Assess a quote, calling it value when EV% is positive.
pub fn assess(quote: &MarketQuote) -> Option<ValueAssessment> {
    assess_with(quote, ValueCriteria::default())
}

/// Assess a quote, calling it value when EV% exceeds `edge_threshold`.
pub fn assess_with_threshold(quote: &MarketQuote, edge_threshold: f64) -> Option<ValueAssessment> {
    assess_with(quote, edge_threshold)
}

/// Assess a quote against `criteria`.
///
/// Returns `None` for malformed quotes (odds ≤ 0 or non-finite inputs).
pub fn assess_with(quote: &MarketQuote, criteria: impl Into<ValueCriteria>) -> Option<ValueAssessment> {
    let criteria = criteria.into();
    if !quote.decimal_odds.is_finite() || quote.decimal_odds <= 0.0 {
        return None;
    }
    if !quote.true_probability.is_finite() || !quote.stake.is_finite() {
        return None;
    }

    let ev = expected_value_percent(quote.true_probability, quote.decimal_odds);
    let confidence = confidence(quote.true_probability);
    Some(ValueAssessment {
        market: quote.market.clone(),
        true_probability: quote.true_probability,
        implied_probability: implied_probability(quote.decimal_odds),
        expected_value_percent: ev,
        expected_return: expected_return(quote.true_probability, quote.decimal_odds, quote.stake),
        confidence,
        is_value: quote.decimal_odds > 1.0
            && ev > criteria.edge_threshold
            && confidence >= criteria.min_confidence,
    })
}

/// Assess every evaluable quote, keeping input order.
///
/// Quotes that cannot be evaluated are logged and skipped; they never abort
/// the rest of the batch.
pub fn assess_all(quotes: &[MarketQuote], criteria: impl Into<ValueCriteria>) -> Vec<ValueAssessment> {
    let criteria = criteria.into();
    quotes
        .iter()
        .filter_map(|quote| {
            if quote.decimal_odds <= 1.0 {
                warn!(
                    market = %quote.market,
                    odds = quote.decimal_odds,
                    "skipping market with non-physical odds"
                );
                return None;
            }
            let assessment = assess_with(quote, criteria);
            if assessment.is_none() {
                warn!(market = %quote.market, "skipping malformed quote");
            }
            assessment
        })
        .collect()
}

/// Recommended markets under `criteria`, best EV first.
///
/// The sort is stable, so equal EV keeps input order.
pub fn rank(quotes: &[MarketQuote], criteria: impl Into<ValueCriteria>) -> Vec<ValueAssessment> {
    let mut ranked: Vec<ValueAssessment> = assess_all(quotes, criteria)
        .into_iter()
        .filter(|a| a.is_value)
        .collect();
    ranked.sort_by(|a, b| b.expected_value_percent.total_cmp(&a.expected_value_percent));
    ranked
}
