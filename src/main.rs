use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use matchday_value::config::Config;
use matchday_value::engine::{
    EstimationMode, MatchPrediction, MatchPredictor, ResultSource, ValueAssessment, VariateSource,
};

#[derive(Serialize)]
struct Report<'a> {
    prediction: &'a MatchPrediction,
    assessments: &'a [ValueAssessment],
    value_bets: &'a [ValueAssessment],
}

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let settings = config.engine_settings()?;
    let classifier = config.classifier()?;
    let odds = config.odds_sheet();

    match config.seed {
        Some(seed) => info!("Seeded run (seed {})", seed),
        None => info!("Entropy-seeded run"),
    }
    let mut source = VariateSource::from_seed_option(config.seed);

    let predictor = MatchPredictor::new(settings);
    let prediction = predictor.predict(
        &config.home_team,
        &config.away_team,
        &config.league,
        EstimationMode::Heuristic,
        &mut source,
    )?;

    let result = classifier.unwrap_or(prediction.result);
    info!(
        "1X2 ({}): home {:.1}% / draw {:.1}% / away {:.1}%, {:?} at {:.1}%",
        match (classifier.is_some(), predictor.settings().result_source) {
            (true, _) => "classifier",
            (false, ResultSource::FormHeuristic) => "form",
            (false, ResultSource::Simulated) => "simulated",
        },
        result.home_win * 100.0,
        result.draw * 100.0,
        result.away_win * 100.0,
        result.predicted_outcome(),
        result.confidence() * 100.0,
    );

    if odds.is_empty() {
        warn!("No odds supplied – reporting probabilities only");
    }

    let assessments = predictor.assess(&prediction, &odds, config.stake, config.min_edge, classifier);
    let value_bets = predictor.value_bets(&prediction, &odds, config.stake, config.min_edge, classifier);

    for bet in &value_bets {
        info!(
            "VALUE {}: p={:.1}% implied={:.1}% confidence={:.1}% EV={:+.1}% return={:+.2}",
            bet.market,
            bet.true_probability * 100.0,
            bet.implied_probability * 100.0,
            bet.confidence * 100.0,
            bet.expected_value_percent,
            bet.expected_return,
        );
    }
    if !odds.is_empty() && value_bets.is_empty() {
        info!("No value found above {:.1}% edge", config.min_edge);
    }

    if config.json {
        let report = Report {
            prediction: &prediction,
            assessments: &assessments,
            value_bets: &value_bets,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
