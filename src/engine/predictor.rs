use chrono::Utc;
use tracing::info;

use super::error::EngineResult;
use super::estimator::{EstimationMode, MatchModel, MatchParameterEstimator};
use super::markets::{build_quotes, OddsSheet};
use super::settings::{EngineSettings, ResultSource};
use super::simulator::simulate;
use super::types::{MarketQuote, MatchPrediction, ResultProbabilities, ValueAssessment};
use super::value::{assess_all, rank, ValueCriteria};
use super::variates::VariateSource;

/// Runs estimate → simulate → quote → assess for one fixture at a time.
///
/// Holds only configuration; each call owns its own parameters and
/// distribution, so one predictor can serve any number of requests.
pub struct MatchPredictor {
    settings: EngineSettings,
    estimator: MatchParameterEstimator,
}

impl MatchPredictor {
    pub fn new(settings: EngineSettings) -> Self {
        let estimator =
            MatchParameterEstimator::new(settings.heuristic_ranges).with_form(settings.form);
        Self {
            settings,
            estimator,
        }
    }

    pub fn with_model(mut self, model: Box<dyn MatchModel>) -> Self {
        self.estimator = self.estimator.with_model(model);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn predict(
        &self,
        home_team: &str,
        away_team: &str,
        league: &str,
        mode: EstimationMode,
        source: &mut VariateSource,
    ) -> EngineResult<MatchPrediction> {
        let parameters = self
            .estimator
            .estimate(home_team, away_team, league, mode, source)?;
        let distribution = simulate(&parameters, &self.settings.simulation, source)?;
        let result = match self.settings.result_source {
            ResultSource::Simulated => distribution.result,
            ResultSource::FormHeuristic => self.estimator.form_result(home_team, away_team, source)?,
        };
        info!(
            "{} vs {} ({}): xG {:.2}-{:.2}, over 2.5 {:.1}%, BTTS {:.1}%, {:?} at {:.1}%",
            home_team,
            away_team,
            league,
            parameters.home_expected_goals,
            parameters.away_expected_goals,
            distribution.empirical_over(2.5) * 100.0,
            distribution.btts_probability * 100.0,
            result.predicted_outcome(),
            result.confidence() * 100.0,
        );
        Ok(MatchPrediction {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            league: league.to_string(),
            parameters,
            distribution,
            result,
            predicted_outcome: result.predicted_outcome(),
            confidence: result.confidence(),
            generated_at: Utc::now(),
        })
    }

    pub fn quotes(
        &self,
        prediction: &MatchPrediction,
        odds: &OddsSheet,
        stake: f64,
        classifier: Option<ResultProbabilities>,
    ) -> Vec<MarketQuote> {
        build_quotes(prediction, odds, stake, &self.settings, classifier)
    }

    fn criteria(&self, edge_threshold: f64) -> ValueCriteria {
        ValueCriteria::new(edge_threshold, self.settings.min_confidence)
    }

    /// Every priced market, in catalogue order.
    pub fn assess(
        &self,
        prediction: &MatchPrediction,
        odds: &OddsSheet,
        stake: f64,
        edge_threshold: f64,
        classifier: Option<ResultProbabilities>,
    ) -> Vec<ValueAssessment> {
        assess_all(&self.quotes(prediction, odds, stake, classifier), self.criteria(edge_threshold))
    }

    /// Value opportunities only, best first.
    pub fn value_bets(
        &self,
        prediction: &MatchPrediction,
        odds: &OddsSheet,
        stake: f64,
        edge_threshold: f64,
        classifier: Option<ResultProbabilities>,
    ) -> Vec<ValueAssessment> {
        rank(&self.quotes(prediction, odds, stake, classifier), self.criteria(edge_threshold))
    }
}

impl Default for MatchPredictor {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::EngineError;
    use crate::engine::types::{MatchOutcome, MatchParameters};
    use approx::assert_relative_eq;

    struct RatesModel;

    impl MatchModel for RatesModel {
        fn estimate(&self, _: &str, _: &str, _: &str) -> EngineResult<MatchParameters> {
            Ok(MatchParameters {
                home_expected_goals: 2.0,
                away_expected_goals: 1.0,
                home_expected_corners: 5.0,
                away_expected_corners: 5.0,
                home_expected_yellow_cards: 2.0,
                away_expected_yellow_cards: 2.0,
                home_expected_red_cards: 0.1,
                away_expected_red_cards: 0.1,
            })
        }
    }

    struct BrokenModel;

    impl MatchModel for BrokenModel {
        fn estimate(&self, _: &str, _: &str, _: &str) -> EngineResult<MatchParameters> {
            Ok(MatchParameters {
                home_expected_goals: 0.0,
                ..RatesModel.estimate("", "", "")?
            })
        }
    }

    #[test]
    fn seeded_predictions_are_reproducible() {
        let predictor = MatchPredictor::default();
        let a = predictor
            .predict("Juventus", "Torino", "Serie A", EstimationMode::Heuristic, &mut VariateSource::seeded(42))
            .unwrap();
        let b = predictor
            .predict("Juventus", "Torino", "Serie A", EstimationMode::Heuristic, &mut VariateSource::seeded(42))
            .unwrap();
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.distribution, b.distribution);
        assert_eq!(a.home_team, "Juventus");
    }

    #[test]
    fn model_scenario_over_2_5_band() {
        let predictor = MatchPredictor::default().with_model(Box::new(RatesModel));
        let pred = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(42))
            .unwrap();
        let over = pred.distribution.over_goals(2.5).unwrap();
        assert!((0.55..=0.70).contains(&over), "over 2.5 = {over:.3}");
    }

    #[test]
    fn invalid_model_rates_surface_as_errors() {
        let predictor = MatchPredictor::default().with_model(Box::new(BrokenModel));
        let err = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRate { field: "home_expected_goals", .. }));
    }

    #[test]
    fn simulated_result_is_the_default_headline() {
        let predictor = MatchPredictor::default().with_model(Box::new(RatesModel));
        let pred = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(11))
            .unwrap();
        assert_eq!(pred.result, pred.distribution.result);
        assert_eq!(pred.predicted_outcome, MatchOutcome::HomeWin);
        assert_eq!(pred.confidence, pred.result.home_win);
    }

    #[test]
    fn form_heuristic_replaces_the_headline_result() {
        let settings = EngineSettings {
            result_source: ResultSource::FormHeuristic,
            ..EngineSettings::default()
        };
        let predictor = MatchPredictor::new(settings).with_model(Box::new(RatesModel));
        let pred = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(11))
            .unwrap();
        assert_ne!(pred.result, pred.distribution.result);
        let r = pred.result;
        assert_relative_eq!(r.home_win + r.draw + r.away_win, 1.0, epsilon = 1e-12);

        // The simulated markets are unaffected by where the 1X2 comes from.
        let baseline = MatchPredictor::default()
            .with_model(Box::new(RatesModel))
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(11))
            .unwrap();
        assert_eq!(pred.distribution, baseline.distribution);

        let odds = OddsSheet {
            home_win: Some(2.0),
            ..OddsSheet::default()
        };
        let quotes = predictor.quotes(&pred, &odds, 10.0, None);
        assert_eq!(quotes[0].true_probability, r.home_win);
    }

    #[test]
    fn confidence_setting_gates_value_bets() {
        let settings = EngineSettings {
            min_confidence: 0.99,
            ..EngineSettings::default()
        };
        let predictor = MatchPredictor::new(settings).with_model(Box::new(RatesModel));
        let pred = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(7))
            .unwrap();
        let odds = OddsSheet {
            home_win: Some(2.40),
            ..OddsSheet::default()
        };
        let all = predictor.assess(&pred, &odds, 10.0, 0.0, None);
        assert_eq!(all.len(), 1);
        assert!(all[0].expected_value_percent > 0.0);
        assert!(!all[0].is_value);
        assert!(predictor.value_bets(&pred, &odds, 10.0, 0.0, None).is_empty());
    }

    #[test]
    fn value_bets_are_ranked_subset_of_assessments() {
        let predictor = MatchPredictor::default().with_model(Box::new(RatesModel));
        let pred = predictor
            .predict("Parma", "Como", "Serie B", EstimationMode::Model, &mut VariateSource::seeded(7))
            .unwrap();
        let odds = OddsSheet {
            home_win: Some(2.40),
            draw: Some(3.60),
            away_win: Some(3.10),
            over_2_5: Some(2.10),
            under_2_5: Some(1.75),
            btts_yes: Some(1.90),
            btts_no: Some(1.90),
            ..OddsSheet::default()
        };
        let all = predictor.assess(&pred, &odds, 10.0, 0.0, None);
        assert_eq!(all.len(), 7);

        let ranked = predictor.value_bets(&pred, &odds, 10.0, 0.0, None);
        assert_eq!(ranked.len(), all.iter().filter(|a| a.is_value).count());
        for pair in ranked.windows(2) {
            assert!(pair[0].expected_value_percent >= pair[1].expected_value_percent);
        }
        // Home win ~0.61 at 2.40 is clear value against these prices.
        assert!(ranked.iter().any(|a| a.market == "home_win"));
    }
}
