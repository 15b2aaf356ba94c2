//! Goal Line (over/under total goals) probabilities at any line.
//!
//! Quarter lines split the stake across the two neighbouring lines, so their
//! over-probability is the mean of the over-probabilities a quarter goal
//! either side. The under side is always `1 - over`.

use serde::{Deserialize, Serialize};

use super::types::OutcomeDistribution;
use super::{clamp_heuristic, sigmoid};

/// Steepness of the total-goals sigmoid.
pub const GOAL_LINE_SIGMOID_STEEPNESS: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDirection {
    Over,
    Under,
}

/// Where the goal-line probability comes from.
#[derive(Debug, Clone, Copy)]
pub enum GoalLineSource<'a> {
    /// Empirical frequencies from a simulation, used as-is.
    Simulated(&'a OutcomeDistribution),
    /// Expected total goals pushed through a sigmoid, clamped to the
    /// heuristic bounds.
    ExpectedTotal(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalLineStrategy {
    #[default]
    Simulated,
    Sigmoid,
}

pub fn goal_line_probability(
    source: GoalLineSource<'_>,
    line: f64,
    direction: LineDirection,
    steepness: f64,
) -> f64 {
    let over = over_probability(source, line, steepness);
    match direction {
        LineDirection::Over => over,
        LineDirection::Under => 1.0 - over,
    }
}

fn over_probability(source: GoalLineSource<'_>, line: f64, steepness: f64) -> f64 {
    let raw = if is_split_line(line) {
        (over_at(source, line - 0.25, steepness) + over_at(source, line + 0.25, steepness)) / 2.0
    } else {
        over_at(source, line, steepness)
    };
    match source {
        GoalLineSource::Simulated(_) => raw,
        GoalLineSource::ExpectedTotal(_) => clamp_heuristic(raw),
    }
}

fn over_at(source: GoalLineSource<'_>, line: f64, steepness: f64) -> f64 {
    match source {
        GoalLineSource::Simulated(dist) => dist.empirical_over(line),
        GoalLineSource::ExpectedTotal(total) => sigmoid(steepness * (total - line)),
    }
}

/// True when `line` is not a multiple of half a goal.
fn is_split_line(line: f64) -> bool {
    (line * 2.0).fract() != 0.0
}
