use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};

/// Per-match scoring rates. Every field is a Poisson mean for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchParameters {
    pub home_expected_goals: f64,
    pub away_expected_goals: f64,
    pub home_expected_corners: f64,
    pub away_expected_corners: f64,
    pub home_expected_yellow_cards: f64,
    pub away_expected_yellow_cards: f64,
    pub home_expected_red_cards: f64,
    pub away_expected_red_cards: f64,
}

impl MatchParameters {
    /// Reject any rate that is not a positive finite number.
    pub fn validate(&self) -> EngineResult<()> {
        for (field, value) in self.rates() {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    /// Reject any rate above `max_rate`.
    pub fn check_ceiling(&self, max_rate: f64) -> EngineResult<()> {
        for (field, value) in self.rates() {
            if value > max_rate {
                return Err(EngineError::InvalidRate { field, value });
            }
        }
        Ok(())
    }

    pub fn expected_total_goals(&self) -> f64 {
        self.home_expected_goals + self.away_expected_goals
    }

    /// Home minus away expected goals, the input of the sigmoid handicap path.
    pub fn expected_goal_difference(&self) -> f64 {
        self.home_expected_goals - self.away_expected_goals
    }

    fn rates(&self) -> [(&'static str, f64); 8] {
        [
            ("home_expected_goals", self.home_expected_goals),
            ("away_expected_goals", self.away_expected_goals),
            ("home_expected_corners", self.home_expected_corners),
            ("away_expected_corners", self.away_expected_corners),
            ("home_expected_yellow_cards", self.home_expected_yellow_cards),
            ("away_expected_yellow_cards", self.away_expected_yellow_cards),
            ("home_expected_red_cards", self.home_expected_red_cards),
            ("away_expected_red_cards", self.away_expected_red_cards),
        ]
    }
}

/// Home / draw / away probabilities. Always sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl ResultProbabilities {
    /// Build from an external classifier's raw outputs, normalising so the
    /// three outcomes sum to exactly one.
    pub fn from_classifier(home_win: f64, draw: f64, away_win: f64) -> EngineResult<Self> {
        let raw = [home_win, draw, away_win];
        if raw.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(EngineError::InvalidProbabilities(format!(
                "expected non-negative finite values, got {home_win}/{draw}/{away_win}"
            )));
        }
        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            return Err(EngineError::InvalidProbabilities(
                "all outcomes are zero".to_string(),
            ));
        }
        let home_win = home_win / sum;
        let draw = draw / sum;
        // Residue goes to the away side so the triple sums to 1.
        let away_win = (1.0 - home_win - draw).max(0.0);
        Ok(Self {
            home_win,
            draw,
            away_win,
        })
    }

    /// Probability of the most likely outcome.
    pub fn confidence(&self) -> f64 {
        self.home_win.max(self.draw).max(self.away_win)
    }

    /// Most likely outcome; ties go to the home side, then the draw.
    pub fn predicted_outcome(&self) -> MatchOutcome {
        if self.home_win >= self.draw && self.home_win >= self.away_win {
            MatchOutcome::HomeWin
        } else if self.draw >= self.away_win {
            MatchOutcome::Draw
        } else {
            MatchOutcome::AwayWin
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

/// Over/under probabilities at a single line. `under` is always `1 - over`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineProbability {
    pub line: f64,
    pub over: f64,
    pub under: f64,
}

impl LineProbability {
    pub fn from_over(line: f64, over: f64) -> Self {
        Self {
            line,
            over,
            under: 1.0 - over,
        }
    }
}

/// Share of simulated matches per total-goals bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalHistogram {
    #[serde(rename = "0-1")]
    pub zero_to_one: f64,
    #[serde(rename = "2")]
    pub two: f64,
    #[serde(rename = "3")]
    pub three: f64,
    #[serde(rename = "4+")]
    pub four_plus: f64,
}

impl GoalHistogram {
    pub fn buckets(&self) -> [(&'static str, f64); 4] {
        [
            ("0-1", self.zero_to_one),
            ("2", self.two),
            ("3", self.three),
            ("4+", self.four_plus),
        ]
    }

    pub fn total(&self) -> f64 {
        self.zero_to_one + self.two + self.three + self.four_plus
    }
}

/// Empirical outcome probabilities from one Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDistribution {
    pub sample_count: usize,
    pub result: ResultProbabilities,
    pub over_under: Vec<LineProbability>,
    pub btts_probability: f64,
    pub corner_thresholds: Vec<LineProbability>,
    pub card_thresholds: Vec<LineProbability>,
    pub booking_point_thresholds: Vec<LineProbability>,
    pub mean_total_goals: f64,
    pub mean_total_corners: f64,
    pub mean_total_cards: f64,
    pub mean_booking_points: f64,
    pub goal_histogram: GoalHistogram,
    /// `total_goals_pmf[k]` is the share of samples with exactly `k` goals.
    pub total_goals_pmf: Vec<f64>,
}

impl OutcomeDistribution {
    pub fn over_goals(&self, line: f64) -> Option<f64> {
        find_line(&self.over_under, line).map(|l| l.over)
    }

    pub fn under_goals(&self, line: f64) -> Option<f64> {
        find_line(&self.over_under, line).map(|l| l.under)
    }

    pub fn over_corners(&self, line: f64) -> Option<f64> {
        find_line(&self.corner_thresholds, line).map(|l| l.over)
    }

    pub fn over_cards(&self, line: f64) -> Option<f64> {
        find_line(&self.card_thresholds, line).map(|l| l.over)
    }

    pub fn over_booking_points(&self, line: f64) -> Option<f64> {
        find_line(&self.booking_point_thresholds, line).map(|l| l.over)
    }

    pub fn btts_no(&self) -> f64 {
        1.0 - self.btts_probability
    }

    /// Share of samples whose total goals strictly exceed `line`, for any
    /// real line, read off the empirical mass function.
    pub fn empirical_over(&self, line: f64) -> f64 {
        self.total_goals_pmf
            .iter()
            .enumerate()
            .filter(|(goals, _)| *goals as f64 > line)
            .map(|(_, p)| p)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }
}

fn find_line(lines: &[LineProbability], line: f64) -> Option<&LineProbability> {
    lines.iter().find(|l| (l.line - line).abs() < 1e-9)
}

/// A bookmaker price for one market, paired with the engine's probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub market: String,
    pub true_probability: f64,
    pub decimal_odds: f64,
    pub stake: f64,
}

impl MarketQuote {
    pub fn new(market: impl Into<String>, true_probability: f64, decimal_odds: f64, stake: f64) -> Self {
        Self {
            market: market.into(),
            true_probability,
            decimal_odds,
            stake,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAssessment {
    pub market: String,
    pub true_probability: f64,
    pub implied_probability: f64,
    pub expected_value_percent: f64,
    pub expected_return: f64,
    /// `max(p, 1 - p)`: how decisive the engine is about this market.
    pub confidence: f64,
    pub is_value: bool,
}

/// Everything produced for one fixture, handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct MatchPrediction {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub parameters: MatchParameters,
    pub distribution: OutcomeDistribution,
    /// Headline 1X2, from the simulation or the form heuristic.
    pub result: ResultProbabilities,
    pub predicted_outcome: MatchOutcome,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}
