//! Per-opponent registry: maps opponent id to `(CTW, n-gram state, short
//! history ring)` with the lifecycle rules from spec §3/§4.4.

use crate::charges::Charges;
use crate::config::{Config, NgramScope};
use crate::ctw::CtwModel;
use crate::ensemble;
use crate::ngram::NgramTable;
use crate::symbol::{Distribution, Symbol};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Everything tracked for one opponent: its own CTW, its own history ring,
/// and (only when `NgramScope::PerOpponent`) its own private n-gram table.
pub struct OpponentModel {
    pub ctw: CtwModel,
    pub local_ngram: Option<NgramTable>,
}

impl OpponentModel {
    fn new(config: &Config) -> Self {
        Self {
            ctw: CtwModel::new(config.ctw_max_depth),
            local_ngram: match config.ngram_scope {
                NgramScope::Global => None,
                NgramScope::PerOpponent => {
                    Some(NgramTable::new(config.ngram_order, config.ngram_min_samples))
                }
            },
        }
    }
}

pub struct Prediction {
    pub our_move: Symbol,
    pub distribution: Distribution,
    pub confidence: f64,
    pub cold_start: bool,
}

/// Maps `opponent_id -> per-opponent model`. The global n-gram table (used
/// when `NgramScope::Global`) is the one cross-opponent mutable structure
/// the core has (spec §5) and is therefore mutex-guarded; the opponent map
/// itself is only ever mutated through `&mut self` so it needs no locking
/// of its own (spec §5: the registry needs reader-writer discipline only
/// while models are inserted/dropped, and a single-threaded `&mut` caller
/// already provides that).
pub struct Registry {
    config: Config,
    opponents: BTreeMap<u64, OpponentModel>,
    global_ngram: Mutex<NgramTable>,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        let global_ngram = NgramTable::new(config.ngram_order, config.ngram_min_samples);
        Self {
            config,
            opponents: BTreeMap::new(),
            global_ngram: Mutex::new(global_ngram),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn opponent(&self, id: u64) -> Option<&OpponentModel> {
        self.opponents.get(&id)
    }

    /// Stable iteration over every tracked opponent, for persistence.
    pub fn iter(&self) -> impl Iterator<Item = (&u64, &OpponentModel)> {
        self.opponents.iter()
    }

    pub fn global_ngram(&self) -> std::sync::MutexGuard<'_, NgramTable> {
        self.global_ngram.lock().expect("global n-gram mutex poisoned")
    }

    /// Drops a model entirely (spec §3 "Destroyed only by explicit registry
    /// reset").
    pub fn reset(&mut self, opponent_id: u64) {
        self.opponents.remove(&opponent_id);
    }

    /// Inserts an already-built model for `opponent_id`, overwriting any
    /// existing one. Used only when rehydrating a registry from a save file
    /// (spec §6), never from live prediction/update traffic.
    pub fn restore_opponent(&mut self, opponent_id: u64, model: OpponentModel) {
        self.opponents.insert(opponent_id, model);
    }

    /// Looks up (lazily creating) the model for `opponent_id`, runs the
    /// ensemble over CTW + n-gram (+ optional charge bias), and returns the
    /// chosen move (spec §4.4).
    pub fn predict(&mut self, opponent_id: u64, charges: Option<Charges>) -> Prediction {
        let config = self.config.clone();
        let model = self
            .opponents
            .entry(opponent_id)
            .or_insert_with(|| OpponentModel::new(&config));

        let required = config.ngram_order.max(2);
        if model.ctw.len() < required {
            return Prediction {
                our_move: Symbol::Rock,
                distribution: Distribution::UNIFORM,
                confidence: 0.0,
                cold_start: true,
            };
        }

        let p_ctw = model.ctw.predict();

        let local_key: Vec<Symbol> = model
            .ctw
            .history
            .iter()
            .rev()
            .take(config.ngram_order)
            .rev()
            .copied()
            .collect();

        let p_ngram = match (&model.local_ngram, config.ngram_scope) {
            (Some(local), NgramScope::PerOpponent) => local.predict(&local_key),
            _ => self
                .global_ngram
                .lock()
                .expect("global n-gram mutex poisoned")
                .predict(&local_key),
        };

        let blended = ensemble::blend(p_ctw, p_ngram, config.ensemble);
        let biased =
            ensemble::apply_charge_bias(blended, charges, config.charge_trigger_gap, config.charge_weight);
        let our_move = ensemble::choose_move(biased);

        Prediction {
            our_move,
            distribution: biased,
            confidence: biased.confidence(),
            cold_start: false,
        }
    }

    /// Advances both models and appends to the persistent history (spec
    /// §4.4). The 2-gram update always uses this opponent's own last-two
    /// symbols as the key, even though the table it writes into may be
    /// shared globally across opponents (spec §4.4 invariant).
    pub fn update(&mut self, opponent_id: u64, symbol: Symbol) {
        let config = self.config.clone();
        let model = self
            .opponents
            .entry(opponent_id)
            .or_insert_with(|| OpponentModel::new(&config));

        if model.ctw.len() >= config.ngram_order {
            let key: Vec<Symbol> = model
                .ctw
                .history
                .iter()
                .rev()
                .take(config.ngram_order)
                .rev()
                .copied()
                .collect();
            match (&mut model.local_ngram, config.ngram_scope) {
                (Some(local), NgramScope::PerOpponent) => local.update(&key, symbol),
                _ => self.global_ngram.lock().expect("global n-gram mutex poisoned").update(&key, symbol),
            }
        }

        model.ctw.update(symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_until_two_symbols_observed() {
        let mut r = Registry::new(Config::default());
        let p = r.predict(1, None);
        assert!(p.cold_start);
        r.update(1, Symbol::Rock);
        let p = r.predict(1, None);
        assert!(p.cold_start);
        r.update(1, Symbol::Rock);
        let p = r.predict(1, None);
        assert!(!p.cold_start);
    }

    #[test]
    fn opponents_never_cross_contaminate_ctw() {
        let mut r = Registry::new(Config::default());
        for _ in 0..10 {
            r.update(1, Symbol::Rock);
        }
        for _ in 0..10 {
            r.update(2, Symbol::Paper);
        }
        let p1 = r.predict(1, None);
        let p2 = r.predict(2, None);
        assert!(p1.distribution.rock > 0.5);
        assert!(p2.distribution.paper > 0.5);
    }

    #[test]
    fn reset_drops_the_model() {
        let mut r = Registry::new(Config::default());
        for _ in 0..5 {
            r.update(1, Symbol::Rock);
        }
        r.reset(1);
        assert!(r.opponent(1).is_none());
    }

    #[test]
    fn heavy_rock_opponent_drives_our_move_to_paper() {
        let mut r = Registry::new(Config::default());
        for _ in 0..50 {
            r.update(1, Symbol::Rock);
            r.predict(1, None);
        }
        let p = r.predict(1, None);
        assert_eq!(p.our_move, Symbol::Paper);
        assert!(p.distribution.rock > 0.6);
    }
}
