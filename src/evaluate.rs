//! Backtest harness (spec §4.6): predict-then-update over a battle log,
//! tallying net advantage and per-opponent accuracy. Optionally splits each
//! opponent's own record stream into a warm-start training prefix and a
//! held-out evaluation suffix.

use crate::battlelog::LogRecord;
use crate::config::Config;
use crate::registry::Registry;
use crate::symbol::Symbol;
use crate::Progress;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    /// `(wins - losses) / total`, zero on an empty tally rather than NaN.
    pub fn net_advantage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.wins as f64 - self.losses as f64) / total as f64
        }
    }

    fn record(&mut self, our_move: Symbol, opponent_move: Symbol) {
        if our_move.beats() == opponent_move {
            self.wins += 1;
        } else if opponent_move.beats() == our_move {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BacktestReport {
    pub overall: Tally,
    pub per_opponent: BTreeMap<u64, Tally>,
}

/// Runs every record through predict-then-update, in order. Records must
/// already be sorted by `(opponent_id, timestamp)`.
pub fn backtest(config: Config, records: &[LogRecord]) -> BacktestReport {
    let mut registry = Registry::new(config);
    run(&mut registry, records)
}

/// Same as [`backtest`], but continuing from an already-warmed `registry`
/// (spec §8 scenario S5, warm-vs-cold comparison).
pub fn backtest_with_registry(registry: &mut Registry, records: &[LogRecord]) -> BacktestReport {
    run(registry, records)
}

fn run(registry: &mut Registry, records: &[LogRecord]) -> BacktestReport {
    let mut report = BacktestReport::default();
    let mut progress = Progress::new(records.len(), (records.len() / 20).max(1));
    for record in records {
        let prediction = registry.predict(record.opponent_id, record.opponent_charges);
        if !prediction.cold_start {
            let tally = report.per_opponent.entry(record.opponent_id).or_default();
            tally.record(prediction.our_move, record.opponent_move);
            report.overall.record(prediction.our_move, record.opponent_move);
        }
        registry.update(record.opponent_id, record.opponent_move);
        progress.tick();
    }
    report
}

/// Splits each opponent's own chronological record stream at `train_ratio`
/// (e.g. `0.9`): the first share bootstraps that opponent's model, the
/// remainder is the held-out evaluation set (spec §4.6 "train/test split").
pub fn split_by_opponent(records: &[LogRecord], train_ratio: f64) -> (Vec<LogRecord>, Vec<LogRecord>) {
    let mut by_opponent: BTreeMap<u64, Vec<&LogRecord>> = BTreeMap::new();
    for r in records {
        by_opponent.entry(r.opponent_id).or_default().push(r);
    }
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, recs) in by_opponent {
        let cut = ((recs.len() as f64) * train_ratio).round() as usize;
        for (i, r) in recs.iter().enumerate() {
            if i < cut {
                train.push((*r).clone());
            } else {
                test.push((*r).clone());
            }
        }
    }
    train.sort_by_key(|r| (r.opponent_id, r.timestamp));
    test.sort_by_key(|r| (r.opponent_id, r.timestamp));
    (train, test)
}
