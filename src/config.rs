use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use crate::engine::markets::{GoalLinePrice, HandicapPrice, OddsSheet};
use crate::engine::types::ResultProbabilities;

pub use crate::engine::settings::{EngineSettings, ResultSource};

/// Football match value finder
#[derive(Parser, Debug, Clone)]
#[command(name = "matchday-value", version, about)]
pub struct Config {
    /// Home team name
    #[arg(long, env = "HOME_TEAM")]
    pub home_team: String,

    /// Away team name
    #[arg(long, env = "AWAY_TEAM")]
    pub away_team: String,

    /// League the fixture belongs to
    #[arg(long, env = "LEAGUE", default_value = "Serie A")]
    pub league: String,

    /// RNG seed for reproducible runs (entropy-seeded when omitted)
    #[arg(long, env = "SIM_SEED")]
    pub seed: Option<u64>,

    /// Monte Carlo sample count (overrides the settings file)
    #[arg(long, env = "SAMPLE_COUNT")]
    pub samples: Option<usize>,

    /// Flat stake per market, in units
    #[arg(long, env = "STAKE", default_value = "10.0")]
    pub stake: f64,

    /// Minimum EV, in percentage points, for a market to count as value
    #[arg(long, env = "MIN_EDGE", default_value = "0.0")]
    pub min_edge: f64,

    /// JSON file with engine settings (rate ranges, handicap curve, lines)
    #[arg(long, env = "ENGINE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Minimum max(p, 1-p) for a market to be recommended (overrides the settings file)
    #[arg(long, env = "MIN_CONFIDENCE")]
    pub min_confidence: Option<f64>,

    /// Take the headline 1X2 from the form heuristic instead of the simulation
    #[arg(long, env = "FORM_RESULT", default_value = "false")]
    pub form_result: bool,

    /// External classifier output as home,draw,away (replaces the headline 1X2)
    #[arg(long, value_delimiter = ',')]
    pub classifier_probs: Option<Vec<f64>>,

    /// Print the prediction and assessments as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    #[arg(long)]
    pub home_win_odds: Option<f64>,
    #[arg(long)]
    pub draw_odds: Option<f64>,
    #[arg(long)]
    pub away_win_odds: Option<f64>,

    #[arg(long)]
    pub over_2_5_odds: Option<f64>,
    #[arg(long)]
    pub under_2_5_odds: Option<f64>,

    #[arg(long)]
    pub btts_yes_odds: Option<f64>,
    #[arg(long)]
    pub btts_no_odds: Option<f64>,

    #[arg(long)]
    pub corners_over_odds: Option<f64>,
    #[arg(long)]
    pub corners_under_odds: Option<f64>,

    #[arg(long)]
    pub cards_over_odds: Option<f64>,
    #[arg(long)]
    pub cards_under_odds: Option<f64>,

    /// Asian Handicap line from the home side's perspective (e.g. -0.75)
    #[arg(long, allow_hyphen_values = true)]
    pub ah_line: Option<f64>,
    #[arg(long)]
    pub ah_home_odds: Option<f64>,
    #[arg(long)]
    pub ah_away_odds: Option<f64>,

    /// Goal line to price (e.g. 2.75)
    #[arg(long)]
    pub goal_line: Option<f64>,
    #[arg(long)]
    pub goal_line_over_odds: Option<f64>,
    #[arg(long)]
    pub goal_line_under_odds: Option<f64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            anyhow::bail!("home and away team names must not be empty");
        }
        if self.home_team == self.away_team {
            anyhow::bail!("home and away team must differ");
        }
        if let Some(0) = self.samples {
            anyhow::bail!("samples must be at least 1");
        }
        if !self.stake.is_finite() || self.stake < 0.0 {
            anyhow::bail!("stake must be a non-negative number");
        }
        if !self.min_edge.is_finite() || self.min_edge < 0.0 {
            anyhow::bail!("min_edge must be a non-negative number");
        }
        if let Some(confidence) = self.min_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                anyhow::bail!("min_confidence must lie in [0, 1]");
            }
        }
        if let Some(line) = self.ah_line {
            if !line.is_finite() {
                anyhow::bail!("ah_line must be finite");
            }
        }
        if let Some(line) = self.goal_line {
            if !line.is_finite() || line < 0.0 {
                anyhow::bail!("goal_line must be a non-negative number");
            }
        }
        Ok(())
    }

    /// Engine settings from the optional JSON file, with CLI overrides applied.
    pub fn engine_settings(&self) -> anyhow::Result<EngineSettings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => EngineSettings::default(),
        };
        if let Some(samples) = self.samples {
            settings.simulation.sample_count = samples;
        }
        if let Some(confidence) = self.min_confidence {
            settings.min_confidence = confidence;
        }
        if self.form_result {
            settings.result_source = ResultSource::FormHeuristic;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn classifier(&self) -> anyhow::Result<Option<ResultProbabilities>> {
        let Some(probs) = &self.classifier_probs else {
            return Ok(None);
        };
        let [home, draw, away] = probs.as_slice() else {
            anyhow::bail!("classifier_probs needs exactly three values: home,draw,away");
        };
        Ok(Some(ResultProbabilities::from_classifier(*home, *draw, *away)?))
    }

    pub fn odds_sheet(&self) -> OddsSheet {
        OddsSheet {
            home_win: self.home_win_odds,
            draw: self.draw_odds,
            away_win: self.away_win_odds,
            over_2_5: self.over_2_5_odds,
            under_2_5: self.under_2_5_odds,
            btts_yes: self.btts_yes_odds,
            btts_no: self.btts_no_odds,
            corners_over_10_5: self.corners_over_odds,
            corners_under_10_5: self.corners_under_odds,
            cards_over_4_5: self.cards_over_odds,
            cards_under_4_5: self.cards_under_odds,
            asian_handicap: self.ah_line.map(|line| HandicapPrice {
                line,
                home_odds: self.ah_home_odds,
                away_odds: self.ah_away_odds,
            }),
            goal_line: self.goal_line.map(|line| GoalLinePrice {
                line,
                over_odds: self.goal_line_over_odds,
                under_odds: self.goal_line_under_odds,
            }),
        }
    }
}

/// Read engine settings from a JSON file. Missing fields keep their defaults.
pub fn load_settings(path: &Path) -> anyhow::Result<EngineSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read engine settings {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse engine settings {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["matchday-value", "--home-team", "Inter Milan", "--away-team", "AC Milan"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn defaults_validate() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.league, "Serie A");
        assert_eq!(config.stake, 10.0);
        assert!(config.odds_sheet().is_empty());
        assert_eq!(config.engine_settings().unwrap(), EngineSettings::default());
    }

    #[test]
    fn same_team_twice_is_rejected() {
        let config = Config::try_parse_from([
            "matchday-value",
            "--home-team",
            "Napoli",
            "--away-team",
            "Napoli",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_stake_is_rejected() {
        let mut config = parse(&[]);
        config.stake = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_override_applies() {
        let config = parse(&["--samples", "2500"]);
        assert_eq!(config.engine_settings().unwrap().simulation.sample_count, 2500);
        let config = parse(&["--samples", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn odds_flags_build_sheet() {
        let config = parse(&[
            "--over-2-5-odds",
            "1.85",
            "--ah-line",
            "-0.75",
            "--ah-home-odds",
            "1.95",
            "--goal-line",
            "2.75",
            "--goal-line-under-odds",
            "1.9",
        ]);
        let sheet = config.odds_sheet();
        assert_eq!(sheet.over_2_5, Some(1.85));
        let ah = sheet.asian_handicap.unwrap();
        assert_eq!(ah.line, -0.75);
        assert_eq!(ah.home_odds, Some(1.95));
        assert_eq!(ah.away_odds, None);
        let gl = sheet.goal_line.unwrap();
        assert_eq!(gl.line, 2.75);
        assert_eq!(gl.under_odds, Some(1.9));
    }

    #[test]
    fn classifier_probs_are_normalised() {
        let config = parse(&["--classifier-probs", "0.5,0.25,0.25"]);
        let r = config.classifier().unwrap().unwrap();
        assert_eq!(r.home_win, 0.5);
        assert!(parse(&[]).classifier().unwrap().is_none());
    }

    #[test]
    fn classifier_needs_exactly_three_values() {
        assert!(parse(&["--classifier-probs", "0.6,0.4"]).classifier().is_err());
        assert!(parse(&["--classifier-probs", "0.4,0.3,0.2,0.1"]).classifier().is_err());
        assert!(parse(&["--classifier-probs", "0,0,0"]).classifier().is_err());
    }

    #[test]
    fn overrides_reach_engine_settings() {
        let settings = parse(&["--min-confidence", "0.6", "--form-result"])
            .engine_settings()
            .unwrap();
        assert_eq!(settings.min_confidence, 0.6);
        assert_eq!(settings.result_source, ResultSource::FormHeuristic);

        let config = parse(&["--min-confidence", "1.5"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn settings_file_is_loaded_then_overridden() {
        let path = std::env::temp_dir().join(format!("matchday-value-{}.json", std::process::id()));
        fs::write(&path, r#"{ "simulation": { "sample_count": 4000 }, "min_confidence": 0.55 }"#).unwrap();
        let path_arg = path.to_string_lossy().into_owned();
        let settings = parse(&["--settings", &path_arg, "--samples", "1500"])
            .engine_settings()
            .unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(settings.simulation.sample_count, 1500);
        assert_eq!(settings.min_confidence, 0.55);
    }

    #[test]
    fn missing_settings_file_is_reported() {
        let err = load_settings(Path::new("/nonexistent/engine.json")).unwrap_err();
        assert!(err.to_string().contains("read engine settings"));
    }
}
