//! Probability and value engine for football betting markets.
//!
//! Estimates per-team expected rates, simulates full-time outcomes with
//! Poisson draws, translates them into market probabilities (1X2, totals,
//! BTTS, corners, cards, Asian Handicap, goal lines) and compares those
//! against bookmaker odds to flag positive expected value.

pub mod config;
pub mod engine;
