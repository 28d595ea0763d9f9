//! Tuning knobs, all of which are part of the persisted state file's
//! `"config"` block (spec §6) so a restart never silently changes
//! behaviour. Defaults mirror spec.md's stated defaults exactly.

use serde::{Deserialize, Serialize};

/// Whether the n-gram table is shared across every opponent (keyed by each
/// opponent's own last-two-symbols) or kept private per opponent. Spec §9:
/// "the repository mostly uses a global 2-gram with an opponent-local key,
/// and this is what wins" — kept as a config flag, not a fork in the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgramScope {
    Global,
    PerOpponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub w_ctw: f64,
    pub w_ngram: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            w_ctw: 0.2,
            w_ngram: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `D`, the CTW tree's maximum context depth.
    pub ctw_max_depth: usize,
    /// Order of the primary n-gram predictor.
    pub ngram_order: usize,
    pub ensemble: EnsembleWeights,
    /// Charge-bias gate: `max(charges) - min(charges) >= charge_trigger_gap`.
    pub charge_trigger_gap: u32,
    /// Mixing weight applied to the charge bias distribution when the gate
    /// trips: `p <- (1 - charge_weight)*p + charge_weight*q`.
    pub charge_weight: f64,
    /// Minimum sample count before the n-gram table trusts its own counts
    /// over a uniform fallback.
    pub ngram_min_samples: u32,
    pub ngram_scope: NgramScope,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ctw_max_depth: 3,
            ngram_order: 2,
            ensemble: EnsembleWeights::default(),
            charge_trigger_gap: 3,
            charge_weight: 0.2,
            ngram_min_samples: 5,
            ngram_scope: NgramScope::Global,
        }
    }
}

impl Config {
    /// Basic structural sanity: weights must sum to 1, depth/order must be
    /// at least 1. Called after loading a config block from disk or from
    /// CLI overrides, never silently corrected.
    pub fn validate(&self) -> Result<(), crate::PredictorError> {
        if self.ctw_max_depth < 1 {
            return Err(crate::PredictorError::BadInput {
                reason: "ctw_max_depth must be >= 1".into(),
            });
        }
        if self.ngram_order < 1 {
            return Err(crate::PredictorError::BadInput {
                reason: "ngram_order must be >= 1".into(),
            });
        }
        let w_total = self.ensemble.w_ctw + self.ensemble.w_ngram;
        if (w_total - 1.0).abs() > 1e-9 {
            return Err(crate::PredictorError::BadInput {
                reason: format!("ensemble weights must sum to 1, got {w_total}"),
            });
        }
        if !(0.0..=1.0).contains(&self.charge_weight) {
            return Err(crate::PredictorError::BadInput {
                reason: "charge_weight must be in [0, 1]".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.ctw_max_depth, 3);
        assert_eq!(c.ngram_order, 2);
        assert_eq!(c.ensemble.w_ctw, 0.2);
        assert_eq!(c.ensemble.w_ngram, 0.8);
        assert_eq!(c.charge_trigger_gap, 3);
        assert_eq!(c.charge_weight, 0.2);
        assert_eq!(c.ngram_min_samples, 5);
        assert_eq!(c.ngram_scope, NgramScope::Global);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_weights_that_dont_sum_to_one() {
        let mut c = Config::default();
        c.ensemble.w_ctw = 0.5;
        assert!(c.validate().is_err());
    }
}
