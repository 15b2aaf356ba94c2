//! Asian Handicap probabilities.
//!
//! Two strategies share one entry point, [`ah_probability`]:
//!
//! - **Result blend**: whole and half lines are a deterministic blend of the
//!   home / draw / away mass. Lines between two half-goal anchors are linearly
//!   interpolated, so a quarter line is exactly the mean of its two
//!   neighbours (the stake is split across them).
//! - **Expected-goal sigmoid**: `sigmoid(k · (xg_diff − handicap))`.
//!
//! Both strategies clamp into `[PROBABILITY_FLOOR, PROBABILITY_CEILING]`, which
//! is where very large handicaps saturate.
//!
//! Only the home side is computed directly. The away side for handicap `h` is
//! the home side for `-h`.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::types::ResultProbabilities;
use super::{clamp_heuristic, sigmoid};

/// Steepness of the expected-goal sigmoid.
pub const AH_SIGMOID_STEEPNESS: f64 = 1.5;

const SATURATED_STEPS: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// What the handicap is priced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandicapBase {
    /// Full-time result probabilities (simulated or from a classifier).
    Result(ResultProbabilities),
    /// Home minus away expected goals.
    ExpectedGoalDifference(f64),
}

impl HandicapBase {
    /// The same fixture seen from the away side.
    pub fn mirrored(self) -> Self {
        match self {
            HandicapBase::Result(r) => HandicapBase::Result(ResultProbabilities {
                home_win: r.away_win,
                draw: r.draw,
                away_win: r.home_win,
            }),
            HandicapBase::ExpectedGoalDifference(diff) => HandicapBase::ExpectedGoalDifference(-diff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandicapStrategy {
    #[default]
    ResultBlend,
    ExpectedGoalSigmoid,
}

/// Blend coefficients for the result strategy.
///
/// Giving goals (negative handicap): the home-win probability is multiplied by
/// a discount. At −0.5 the discount is 1 (the draw is a loss); `giving_discounts`
/// lists the discounts at −1.0, −1.5, −2.0, … and each further half goal past
/// the last anchor multiplies by `giving_tail_decay`.
///
/// Receiving goals (positive handicap): at +0.5 the bet wins on home win or
/// draw; from +1.0 on it also takes a share of the away-win mass equal to
/// `min(share_base + share_slope · h, share_cap)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandicapCurve {
    pub giving_discounts: Vec<f64>,
    pub giving_tail_decay: f64,
    pub receiving_share_base: f64,
    pub receiving_share_slope: f64,
    pub receiving_share_cap: f64,
}

impl Default for HandicapCurve {
    fn default() -> Self {
        Self {
            giving_discounts: vec![0.70, 0.50, 0.33],
            giving_tail_decay: 0.75,
            receiving_share_base: 0.25,
            receiving_share_slope: 0.12,
            receiving_share_cap: 0.70,
        }
    }
}

impl HandicapCurve {
    /// Reject coefficients that would break monotonicity in the handicap.
    pub fn validate(&self) -> EngineResult<()> {
        let mut previous = 1.0;
        for &d in &self.giving_discounts {
            if !(d > 0.0 && d < previous) {
                return Err(EngineError::Settings(format!(
                    "giving discounts must be strictly decreasing within (0, 1), got {:?}",
                    self.giving_discounts
                )));
            }
            previous = d;
        }
        if !(self.giving_tail_decay > 0.0 && self.giving_tail_decay < 1.0) {
            return Err(EngineError::Settings(format!(
                "giving tail decay must lie in (0, 1), got {}",
                self.giving_tail_decay
            )));
        }
        let first_share = self.receiving_share_base + self.receiving_share_slope;
        if !(first_share > 0.0
            && self.receiving_share_slope >= 0.0
            && self.receiving_share_cap >= first_share
            && self.receiving_share_cap <= 1.0)
        {
            return Err(EngineError::Settings(format!(
                "receiving share must start positive, grow, and cap within (0, 1]: base {} slope {} cap {}",
                self.receiving_share_base, self.receiving_share_slope, self.receiving_share_cap
            )));
        }
        Ok(())
    }

    /// Home-perspective probability at the half-goal anchor `steps / 2`.
    ///
    /// `steps` is a whole number kept as `f64` so arbitrarily large lines
    /// never overflow an integer.
    fn anchor(&self, r: &ResultProbabilities, steps: f64) -> f64 {
        if steps < -1.0 {
            r.home_win * self.giving_discount(-steps - 2.0)
        } else if steps == -1.0 {
            r.home_win
        } else if steps == 0.0 {
            r.home_win + 0.5 * r.draw
        } else if steps == 1.0 {
            r.home_win + r.draw
        } else {
            let handicap = steps / 2.0;
            let share = (self.receiving_share_base + self.receiving_share_slope * handicap)
                .min(self.receiving_share_cap);
            r.home_win + r.draw + r.away_win * share
        }
    }

    /// Discount at the `index`-th anchor past −0.5 (index 0 is −1.0).
    fn giving_discount(&self, index: f64) -> f64 {
        let listed = self.giving_discounts.len() as f64;
        if index < listed {
            return self.giving_discounts[index as usize];
        }
        let last = self.giving_discounts.last().copied().unwrap_or(1.0);
        last * self.giving_tail_decay.powf(index + 1.0 - listed)
    }

    /// Home-perspective probability at any real handicap, interpolating
    /// linearly between the two surrounding half-goal anchors.
    fn blend(&self, r: &ResultProbabilities, handicap: f64) -> f64 {
        // Both tails are flat long before this many half goals.
        let scaled = (handicap * 2.0).clamp(-SATURATED_STEPS, SATURATED_STEPS);
        let lo = scaled.floor();
        let frac = scaled - lo;
        let at_lo = self.anchor(r, lo);
        if frac == 0.0 {
            return at_lo;
        }
        let at_hi = self.anchor(r, lo + 1.0);
        if frac == 0.5 {
            return (at_lo + at_hi) / 2.0;
        }
        at_lo * (1.0 - frac) + at_hi * frac
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandicapSettings {
    pub strategy: HandicapStrategy,
    pub curve: HandicapCurve,
    pub sigmoid_steepness: f64,
}

impl Default for HandicapSettings {
    fn default() -> Self {
        Self {
            strategy: HandicapStrategy::default(),
            curve: HandicapCurve::default(),
            sigmoid_steepness: AH_SIGMOID_STEEPNESS,
        }
    }
}

impl HandicapSettings {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.sigmoid_steepness.is_finite() && self.sigmoid_steepness > 0.0) {
            return Err(EngineError::Settings(format!(
                "handicap sigmoid steepness must be positive, got {}",
                self.sigmoid_steepness
            )));
        }
        self.curve.validate()
    }
}

/// Probability that a bet on `side` at `handicap` wins.
///
/// For a draw-no-bet style push only the conditional win probability is
/// reported; the refunded half of the stake is not modelled as an outcome.
///
/// `Side::Away` reads the away bet off the home curve at `-handicap`. Quoted
/// away prices are instead priced as the home side of `base.mirrored()` at
/// the away team's own line (see `markets::build_quotes`), so the away team's
/// result mass drives its own curve.
pub fn ah_probability(
    base: HandicapBase,
    handicap: f64,
    side: Side,
    settings: &HandicapSettings,
) -> f64 {
    match side {
        Side::Home => home_probability(base, handicap, settings),
        Side::Away => ah_probability(base, -handicap, Side::Home, settings),
    }
}

fn home_probability(base: HandicapBase, handicap: f64, settings: &HandicapSettings) -> f64 {
    let raw = match base {
        HandicapBase::Result(r) => settings.curve.blend(&r, handicap),
        HandicapBase::ExpectedGoalDifference(diff) => {
            sigmoid(settings.sigmoid_steepness * (diff - handicap))
        }
    };
    clamp_heuristic(raw)
}
