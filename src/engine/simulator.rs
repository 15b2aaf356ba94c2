//! Monte Carlo outcome simulator.
//!
//! Home and away counts are independent Poisson draws; no correlation between
//! the sides is modelled. Goals, corners, yellows and reds are each drawn from
//! their own streams in a fixed order so a seeded source reproduces the same
//! distribution exactly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{EngineError, EngineResult};
use super::types::{GoalHistogram, LineProbability, MatchParameters, OutcomeDistribution, ResultProbabilities};
use super::variates::VariateSource;

pub const DEFAULT_SAMPLE_COUNT: usize = 10_000;

/// Booking-point weights: a yellow is worth 10, a red 25.
pub const YELLOW_BOOKING_POINTS: u32 = 10;
pub const RED_BOOKING_POINTS: u32 = 25;

/// Largest per-side rate the simulator accepts by default. Real fixtures sit
/// well below it; far larger means would make the goal PMF huge.
pub const DEFAULT_MAX_RATE: f64 = 30.0;

/// Upper bound on a configured `max_rate`.
pub const MAX_RATE_LIMIT: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub sample_count: usize,
    pub goal_lines: Vec<f64>,
    pub corner_lines: Vec<f64>,
    pub card_lines: Vec<f64>,
    pub booking_point_lines: Vec<f64>,
    /// Rates above this are rejected as `InvalidRate` before sampling.
    pub max_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            goal_lines: vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0],
            corner_lines: vec![8.5, 9.5, 10.5, 11.5],
            card_lines: vec![3.5, 4.5, 5.5],
            booking_point_lines: vec![40.0, 50.0, 60.0],
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

impl SimulationConfig {
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.sample_count == 0 {
            return Err(EngineError::InvalidSampleCount);
        }
        if !(self.max_rate > 0.0 && self.max_rate <= MAX_RATE_LIMIT) {
            return Err(EngineError::Settings(format!(
                "max_rate must lie in (0, {MAX_RATE_LIMIT}], got {}",
                self.max_rate
            )));
        }
        let all_lines = self
            .goal_lines
            .iter()
            .chain(&self.corner_lines)
            .chain(&self.card_lines)
            .chain(&self.booking_point_lines);
        for line in all_lines {
            if !line.is_finite() {
                return Err(EngineError::Settings(format!("line {line} is not finite")));
            }
        }
        Ok(())
    }
}

/// Run the simulation for one fixture.
///
/// Rates are validated before any sampling happens; after that the
/// simulation cannot fail.
pub fn simulate(
    params: &MatchParameters,
    config: &SimulationConfig,
    source: &mut VariateSource,
) -> EngineResult<OutcomeDistribution> {
    config.validate()?;
    params.validate()?;
    params.check_ceiling(config.max_rate)?;
    let n = config.sample_count;

    let home_goals = source.poisson(params.home_expected_goals, n);
    let away_goals = source.poisson(params.away_expected_goals, n);
    let home_corners = source.poisson(params.home_expected_corners, n);
    let away_corners = source.poisson(params.away_expected_corners, n);
    let home_yellows = source.poisson(params.home_expected_yellow_cards, n);
    let away_yellows = source.poisson(params.away_expected_yellow_cards, n);
    let home_reds = source.poisson(params.home_expected_red_cards, n);
    let away_reds = source.poisson(params.away_expected_red_cards, n);

    let total_goals = pairwise_sum(&home_goals, &away_goals);
    let total_corners = pairwise_sum(&home_corners, &away_corners);
    let yellows = pairwise_sum(&home_yellows, &away_yellows);
    let reds = pairwise_sum(&home_reds, &away_reds);
    let total_cards = pairwise_sum(&yellows, &reds);
    let booking_points: Vec<u32> = yellows
        .iter()
        .zip(&reds)
        .map(|(y, r)| {
            y.saturating_mul(YELLOW_BOOKING_POINTS)
                .saturating_add(r.saturating_mul(RED_BOOKING_POINTS))
        })
        .collect();

    let mut home_wins = 0usize;
    let mut draws = 0usize;
    let mut both_scored = 0usize;
    for (h, a) in home_goals.iter().zip(&away_goals) {
        if h > a {
            home_wins += 1;
        } else if h == a {
            draws += 1;
        }
        if *h > 0 && *a > 0 {
            both_scored += 1;
        }
    }
    let home_win = share(home_wins, n);
    let draw = share(draws, n);
    let result = ResultProbabilities {
        home_win,
        draw,
        away_win: share(n - home_wins - draws, n),
    };

    let total_goals_pmf = mass_function(&total_goals);
    let goal_histogram = GoalHistogram {
        zero_to_one: total_goals_pmf.iter().take(2).sum(),
        two: total_goals_pmf.get(2).copied().unwrap_or(0.0),
        three: total_goals_pmf.get(3).copied().unwrap_or(0.0),
        four_plus: total_goals_pmf.iter().skip(4).sum(),
    };

    let dist = OutcomeDistribution {
        sample_count: n,
        result,
        over_under: thresholds(&total_goals, &config.goal_lines),
        btts_probability: share(both_scored, n),
        corner_thresholds: thresholds(&total_corners, &config.corner_lines),
        card_thresholds: thresholds(&total_cards, &config.card_lines),
        booking_point_thresholds: thresholds(&booking_points, &config.booking_point_lines),
        mean_total_goals: mean(&total_goals),
        mean_total_corners: mean(&total_corners),
        mean_total_cards: mean(&total_cards),
        mean_booking_points: mean(&booking_points),
        goal_histogram,
        total_goals_pmf,
    };

    debug!(
        samples = n,
        mean_goals = dist.mean_total_goals,
        btts = dist.btts_probability,
        home_win = dist.result.home_win,
        "simulation complete"
    );
    Ok(dist)
}

fn pairwise_sum(a: &[u32], b: &[u32]) -> Vec<u32> {
    a.iter().zip(b).map(|(x, y)| x.saturating_add(*y)).collect()
}

fn share(count: usize, n: usize) -> f64 {
    count as f64 / n as f64
}

fn mean(samples: &[u32]) -> f64 {
    samples.iter().map(|&x| x as f64).sum::<f64>() / samples.len() as f64
}

fn over_share(samples: &[u32], line: f64) -> f64 {
    share(samples.iter().filter(|&&x| x as f64 > line).count(), samples.len())
}

fn thresholds(samples: &[u32], lines: &[f64]) -> Vec<LineProbability> {
    lines
        .iter()
        .map(|&line| LineProbability::from_over(line, over_share(samples, line)))
        .collect()
}

fn mass_function(samples: &[u32]) -> Vec<f64> {
    let max = samples.iter().copied().max().unwrap_or(0) as usize;
    let mut counts = vec![0usize; max + 1];
    for &x in samples {
        counts[x as usize] += 1;
    }
    counts.into_iter().map(|c| share(c, samples.len())).collect()
}
