//! Bookmaker prices for one fixture and the quotes built from them.

use serde::{Deserialize, Serialize};

use super::goal_line::{goal_line_probability, GoalLineSource, GoalLineStrategy, LineDirection};
use super::handicap::{ah_probability, HandicapBase, HandicapStrategy, Side};
use super::types::{MarketQuote, MatchPrediction, ResultProbabilities};
use super::settings::EngineSettings;

pub const HEADLINE_GOAL_LINE: f64 = 2.5;
pub const HEADLINE_CORNER_LINE: f64 = 10.5;
pub const HEADLINE_CARD_LINE: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandicapPrice {
    /// Handicap from the home side's perspective, e.g. -0.75.
    pub line: f64,
    pub home_odds: Option<f64>,
    pub away_odds: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalLinePrice {
    pub line: f64,
    pub over_odds: Option<f64>,
    pub under_odds: Option<f64>,
}

/// Decimal odds per market. Missing prices are simply not quoted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsSheet {
    pub home_win: Option<f64>,
    pub draw: Option<f64>,
    pub away_win: Option<f64>,
    pub over_2_5: Option<f64>,
    pub under_2_5: Option<f64>,
    pub btts_yes: Option<f64>,
    pub btts_no: Option<f64>,
    pub corners_over_10_5: Option<f64>,
    pub corners_under_10_5: Option<f64>,
    pub cards_over_4_5: Option<f64>,
    pub cards_under_4_5: Option<f64>,
    pub asian_handicap: Option<HandicapPrice>,
    pub goal_line: Option<GoalLinePrice>,
}

impl OddsSheet {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Pair every priced market with the engine's probability for it.
///
/// `classifier` replaces the prediction's 1X2 probabilities when an external
/// classifier has priced the result.
pub fn build_quotes(
    prediction: &MatchPrediction,
    odds: &OddsSheet,
    stake: f64,
    settings: &EngineSettings,
    classifier: Option<ResultProbabilities>,
) -> Vec<MarketQuote> {
    let dist = &prediction.distribution;
    let result = classifier.unwrap_or(prediction.result);
    let mut quotes = Vec::new();
    let mut push = |market: String, probability: Option<f64>, price: Option<f64>| {
        if let (Some(p), Some(o)) = (probability, price) {
            quotes.push(MarketQuote::new(market, p, o, stake));
        }
    };

    push("home_win".into(), Some(result.home_win), odds.home_win);
    push("draw".into(), Some(result.draw), odds.draw);
    push("away_win".into(), Some(result.away_win), odds.away_win);

    let simulated = GoalLineSource::Simulated(dist);
    let steepness = settings.goal_line_steepness;
    push(
        "over_2_5".into(),
        Some(goal_line_probability(simulated, HEADLINE_GOAL_LINE, LineDirection::Over, steepness)),
        odds.over_2_5,
    );
    push(
        "under_2_5".into(),
        Some(goal_line_probability(simulated, HEADLINE_GOAL_LINE, LineDirection::Under, steepness)),
        odds.under_2_5,
    );
    push("btts_yes".into(), Some(dist.btts_probability), odds.btts_yes);
    push("btts_no".into(), Some(dist.btts_no()), odds.btts_no);

    let corners_over = dist.over_corners(HEADLINE_CORNER_LINE);
    push("corners_over_10_5".into(), corners_over, odds.corners_over_10_5);
    push("corners_under_10_5".into(), corners_over.map(|p| 1.0 - p), odds.corners_under_10_5);
    let cards_over = dist.over_cards(HEADLINE_CARD_LINE);
    push("cards_over_4_5".into(), cards_over, odds.cards_over_4_5);
    push("cards_under_4_5".into(), cards_over.map(|p| 1.0 - p), odds.cards_under_4_5);

    if let Some(ah) = odds.asian_handicap {
        let base = match settings.handicap.strategy {
            HandicapStrategy::ResultBlend => HandicapBase::Result(result),
            HandicapStrategy::ExpectedGoalSigmoid => {
                HandicapBase::ExpectedGoalDifference(prediction.parameters.expected_goal_difference())
            }
        };
        // The away bet on a home line `h` is the away team receiving `-h`,
        // priced as a home-side bet on the mirrored fixture.
        let away_line = 0.0 - ah.line;
        let home = ah_probability(base, ah.line, Side::Home, &settings.handicap);
        let away = ah_probability(base.mirrored(), away_line, Side::Home, &settings.handicap);
        push(format!("ah_home_{:+}", ah.line), Some(home), ah.home_odds);
        push(format!("ah_away_{:+}", away_line), Some(away), ah.away_odds);
    }

    if let Some(gl) = odds.goal_line {
        let source = match settings.goal_line_strategy {
            GoalLineStrategy::Simulated => simulated,
            GoalLineStrategy::Sigmoid => {
                GoalLineSource::ExpectedTotal(prediction.parameters.expected_total_goals())
            }
        };
        let over = goal_line_probability(source, gl.line, LineDirection::Over, steepness);
        let under = goal_line_probability(source, gl.line, LineDirection::Under, steepness);
        push(format!("goal_line_over_{}", gl.line), Some(over), gl.over_odds);
        push(format!("goal_line_under_{}", gl.line), Some(under), gl.under_odds);
    }

    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::simulator::simulate;
    use crate::engine::types::MatchParameters;
    use crate::engine::variates::VariateSource;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn prediction() -> MatchPrediction {
        let parameters = MatchParameters {
            home_expected_goals: 2.0,
            away_expected_goals: 1.0,
            home_expected_corners: 5.5,
            away_expected_corners: 4.5,
            home_expected_yellow_cards: 2.1,
            away_expected_yellow_cards: 2.4,
            home_expected_red_cards: 0.1,
            away_expected_red_cards: 0.1,
        };
        let settings = EngineSettings::default();
        let distribution =
            simulate(&parameters, &settings.simulation, &mut VariateSource::seeded(42)).unwrap();
        let result = distribution.result;
        MatchPrediction {
            home_team: "Real Madrid".into(),
            away_team: "Getafe".into(),
            league: "La Liga".into(),
            parameters,
            distribution,
            result,
            predicted_outcome: result.predicted_outcome(),
            confidence: result.confidence(),
            generated_at: Utc::now(),
        }
    }

    fn find<'a>(quotes: &'a [MarketQuote], market: &str) -> &'a MarketQuote {
        quotes
            .iter()
            .find(|q| q.market == market)
            .unwrap_or_else(|| panic!("missing market {market}"))
    }

    #[test]
    fn empty_sheet_quotes_nothing() {
        let quotes = build_quotes(&prediction(), &OddsSheet::default(), 10.0, &EngineSettings::default(), None);
        assert!(quotes.is_empty());
        assert!(OddsSheet::default().is_empty());
    }

    #[test]
    fn priced_markets_carry_distribution_probabilities() {
        let pred = prediction();
        let odds = OddsSheet {
            over_2_5: Some(1.85),
            under_2_5: Some(2.00),
            btts_yes: Some(1.75),
            corners_over_10_5: Some(1.90),
            cards_under_4_5: Some(1.90),
            ..OddsSheet::default()
        };
        let quotes = build_quotes(&pred, &odds, 10.0, &EngineSettings::default(), None);
        assert_eq!(quotes.len(), 5);

        let dist = &pred.distribution;
        let over = find(&quotes, "over_2_5");
        let under = find(&quotes, "under_2_5");
        assert_relative_eq!(over.true_probability, dist.over_goals(2.5).unwrap(), epsilon = 1e-9);
        assert_eq!(under.true_probability, 1.0 - over.true_probability);
        assert_eq!(find(&quotes, "btts_yes").true_probability, dist.btts_probability);
        assert_eq!(find(&quotes, "corners_over_10_5").true_probability, dist.over_corners(10.5).unwrap());
        assert_eq!(
            find(&quotes, "cards_under_4_5").true_probability,
            1.0 - dist.over_cards(4.5).unwrap()
        );
        assert!(quotes.iter().all(|q| q.stake == 10.0));
    }

    #[test]
    fn classifier_overrides_simulated_result() {
        let classifier = ResultProbabilities::from_classifier(0.5, 0.3, 0.2).unwrap();
        let odds = OddsSheet {
            home_win: Some(2.2),
            asian_handicap: Some(HandicapPrice {
                line: 0.0,
                home_odds: Some(1.6),
                away_odds: Some(2.4),
            }),
            ..OddsSheet::default()
        };
        let quotes = build_quotes(&prediction(), &odds, 5.0, &EngineSettings::default(), Some(classifier));
        assert_relative_eq!(find(&quotes, "home_win").true_probability, 0.5, epsilon = 1e-12);
        assert_relative_eq!(find(&quotes, "ah_home_+0").true_probability, 0.65, epsilon = 1e-12);
    }

    #[test]
    fn handicap_sides_are_labelled_from_their_own_perspective() {
        let odds = OddsSheet {
            asian_handicap: Some(HandicapPrice {
                line: -0.75,
                home_odds: Some(1.95),
                away_odds: Some(1.95),
            }),
            ..OddsSheet::default()
        };
        let quotes = build_quotes(&prediction(), &odds, 10.0, &EngineSettings::default(), None);
        let home = find(&quotes, "ah_home_-0.75");
        let away = find(&quotes, "ah_away_+0.75");
        assert!(home.true_probability < away.true_probability);
    }

    #[test]
    fn goal_line_follows_configured_strategy() {
        let pred = prediction();
        let odds = OddsSheet {
            goal_line: Some(GoalLinePrice {
                line: 2.75,
                over_odds: Some(2.05),
                under_odds: Some(1.80),
            }),
            ..OddsSheet::default()
        };
        let simulated = build_quotes(&pred, &odds, 10.0, &EngineSettings::default(), None);
        let over = find(&simulated, "goal_line_over_2.75").true_probability;
        let expected = (pred.distribution.empirical_over(2.5) + pred.distribution.empirical_over(3.0)) / 2.0;
        assert_relative_eq!(over, expected, epsilon = 1e-12);

        let mut settings = EngineSettings::default();
        settings.goal_line_strategy = GoalLineStrategy::Sigmoid;
        let sigmoid = build_quotes(&pred, &odds, 10.0, &settings, None);
        let over = find(&sigmoid, "goal_line_over_2.75").true_probability;
        let under = find(&sigmoid, "goal_line_under_2.75").true_probability;
        assert!((0.05..=0.95).contains(&over));
        assert_eq!(under, 1.0 - over);
    }
}
