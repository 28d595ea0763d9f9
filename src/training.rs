//! Offline bootstrap: replay a battle log straight into a fresh registry
//! with no predict calls, so the result is warm-start equivalent to having
//! played every record online (spec §4.5, property "warm-start
//! equivalence").

use crate::battlelog::LogRecord;
use crate::config::Config;
use crate::registry::Registry;
use crate::Progress;

/// Builds a [`Registry`] by replaying `records` in order, updating only
/// (never predicting). Records must already be sorted by
/// `(opponent_id, timestamp)`; [`crate::battlelog::read_log`] guarantees this.
pub fn bootstrap(config: Config, records: &[LogRecord]) -> Registry {
    let mut registry = Registry::new(config);
    let mut progress = Progress::new(records.len(), (records.len() / 20).max(1));
    for record in records {
        registry.update(record.opponent_id, record.opponent_move);
        progress.tick();
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    fn record(opponent_id: u64, timestamp: i64, mv: Symbol) -> LogRecord {
        LogRecord {
            opponent_id,
            timestamp,
            opponent_move: mv,
            our_move: None,
            opponent_charges: None,
        }
    }

    #[test]
    fn bootstrap_matches_online_replay() {
        let records = vec![
            record(1, 1, Symbol::Rock),
            record(1, 2, Symbol::Rock),
            record(1, 3, Symbol::Paper),
            record(1, 4, Symbol::Rock),
        ];

        let mut online = Registry::new(Config::default());
        for r in &records {
            online.update(r.opponent_id, r.opponent_move);
        }

        let mut warm = bootstrap(Config::default(), &records);

        let p_online = online.predict(1, None).distribution;
        let p_warm = warm.predict(1, None).distribution;
        assert_eq!(p_online, p_warm);
    }

    #[test]
    fn bootstrap_keeps_opponents_independent() {
        let records = vec![
            record(1, 1, Symbol::Rock),
            record(2, 1, Symbol::Paper),
            record(1, 2, Symbol::Rock),
            record(2, 2, Symbol::Paper),
        ];
        let mut registry = bootstrap(Config::default(), &records);
        assert!(registry.predict(1, None).distribution.rock > 0.5);
        assert!(registry.predict(2, None).distribution.paper > 0.5);
    }
}
