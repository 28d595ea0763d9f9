//! Reads the offline battle log used by `bootstrap` and `backtest` (spec
//! §4.5, §4.6): one JSON object per line, chronologically ordered within
//! each opponent.

use crate::charges::Charges;
use crate::error::PredictorError;
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub opponent_id: u64,
    pub timestamp: i64,
    pub opponent_move: Symbol,
    #[serde(default)]
    pub our_move: Option<Symbol>,
    #[serde(default)]
    pub opponent_charges: Option<Charges>,
}

/// Reads every line of `path` as a [`LogRecord`], then sorts by
/// `(opponent_id, timestamp)` so replay is deterministic regardless of the
/// file's original interleaving (spec §4.5 "chronological per opponent").
/// A malformed line is a `BadInput` naming the 1-based line number.
pub fn read_log(path: &Path) -> Result<Vec<LogRecord>, PredictorError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: LogRecord = serde_json::from_str(&line).map_err(|e| PredictorError::BadInput {
            reason: format!("battle log line {}: {e}", lineno + 1),
        })?;
        records.push(record);
    }
    records.sort_by_key(|r| (r.opponent_id, r.timestamp));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_sorts_by_opponent_then_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"opponent_id\":2,\"timestamp\":5,\"opponent_move\":\"rock\"}\n",
                "{\"opponent_id\":1,\"timestamp\":2,\"opponent_move\":\"paper\"}\n",
                "{\"opponent_id\":1,\"timestamp\":1,\"opponent_move\":\"rock\"}\n",
            ),
        )
        .unwrap();
        let records = read_log(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].opponent_id, 1);
        assert_eq!(records[0].timestamp, 1);
        assert_eq!(records[1].opponent_id, 1);
        assert_eq!(records[1].timestamp, 2);
        assert_eq!(records[2].opponent_id, 2);
    }

    #[test]
    fn malformed_line_is_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(&path, "not json\n").unwrap();
        match read_log(&path) {
            Err(PredictorError::BadInput { .. }) => {}
            other => panic!("expected BadInput, got {other:?}"),
        }
    }

    #[test]
    fn skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        std::fs::write(
            &path,
            "{\"opponent_id\":1,\"timestamp\":1,\"opponent_move\":\"rock\"}\n\n",
        )
        .unwrap();
        assert_eq!(read_log(&path).unwrap().len(), 1);
    }
}
