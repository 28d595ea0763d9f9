//! Command-line surface (spec §6 "CLI"): `bootstrap`, `backtest`, `predict`.
//! Mirrors the teacher's `clap` derive style from its own binaries.

use crate::charges::Charges;
use crate::config::Config;
use crate::error::PredictorError;
use crate::symbol::{Distribution, Symbol};
use crate::{battlelog, evaluate, persistence, training};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rps-predictor", about = "Per-opponent rock/paper/scissor move predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a battle log into a fresh registry and save the result.
    Bootstrap {
        #[arg(long)]
        log: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Predict-then-update over a battle log and report net advantage.
    Backtest {
        #[arg(long)]
        log: PathBuf,
        #[arg(long)]
        state: Option<PathBuf>,
        /// Fraction of each opponent's own record stream used to warm-start
        /// before evaluating against the remainder.
        #[arg(long)]
        split: Option<f64>,
    },
    /// Predict one move for a single opponent from a saved state.
    Predict {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        opponent: u64,
        /// `"r,p,s"` charge counts, if known.
        #[arg(long)]
        charges: Option<String>,
    },
}

/// JSON shape printed to stdout by the `predict` subcommand (spec §6
/// "single-shot prediction; prints JSON to stdout").
#[derive(Debug, Serialize)]
struct PredictResult {
    #[serde(rename = "move")]
    r#move: Symbol,
    distribution: Distribution,
    confidence: f64,
    cold_start: bool,
}

/// Runs a parsed command and returns the process exit code (spec §6):
/// `0` success, `1` bad input, `2` persistence failure, `>=3` any other
/// unexpected failure.
pub fn run(cli: Cli) -> i32 {
    match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{err}");
            exit_code_for(&err)
        }
    }
}

fn exit_code_for(err: &PredictorError) -> i32 {
    match err {
        PredictorError::BadInput { .. } => 1,
        PredictorError::PersistenceCorrupt { .. } | PredictorError::VersionMismatch { .. } => 2,
        PredictorError::CapacityExhausted { .. } | PredictorError::Io(_) | PredictorError::Json(_) => 3,
    }
}

fn dispatch(cli: Cli) -> Result<(), PredictorError> {
    match cli.command {
        Command::Bootstrap { log, out } => {
            let records = battlelog::read_log(&log)?;
            let registry = training::bootstrap(Config::default(), &records);
            let timestamp = records.last().map(|r| r.timestamp).unwrap_or(0);
            persistence::save(&registry, &out, timestamp)?;
            log::info!("bootstrapped {} records into {}", records.len(), out.display());
            Ok(())
        }
        Command::Backtest { log, state, split } => {
            let records = battlelog::read_log(&log)?;
            let config = match &state {
                Some(path) if path.exists() => persistence::load(path)?.config().clone(),
                _ => Config::default(),
            };

            let report = match split {
                Some(ratio) => {
                    let (train, test) = evaluate::split_by_opponent(&records, ratio);
                    let mut registry = training::bootstrap(config, &train);
                    evaluate::backtest_with_registry(&mut registry, &test)
                }
                None => evaluate::backtest(config, &records),
            };

            println!(
                "overall: wins={} losses={} draws={} net_advantage={:.4}",
                report.overall.wins,
                report.overall.losses,
                report.overall.draws,
                report.overall.net_advantage()
            );
            for (opponent_id, tally) in &report.per_opponent {
                println!(
                    "  opponent {opponent_id}: wins={} losses={} draws={} net_advantage={:.4}",
                    tally.wins,
                    tally.losses,
                    tally.draws,
                    tally.net_advantage()
                );
            }
            Ok(())
        }
        Command::Predict {
            state,
            opponent,
            charges,
        } => {
            let mut registry = persistence::load(&state)?;
            let charges = charges.map(|s| Charges::parse(&s)).transpose()?;
            let prediction = registry.predict(opponent, charges);
            let result = PredictResult {
                r#move: prediction.our_move,
                distribution: prediction.distribution,
                confidence: prediction.confidence,
                cold_start: prediction.cold_start,
            };
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
    }
}
