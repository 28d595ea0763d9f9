//! Fixed-order n-gram predictor (spec §4.2), order 2 by default. The key
//! space is complete: every `order`-tuple of symbols exists with zero
//! counts from construction, so lookups never need an `Option`.

use crate::symbol::{Distribution, Symbol};
use std::collections::HashMap;

pub type Key = Vec<Symbol>;

#[derive(Debug, Clone)]
pub struct NgramTable {
    order: usize,
    min_samples: u32,
    counts: HashMap<Key, [u64; 3]>,
}

impl NgramTable {
    pub fn new(order: usize, min_samples: u32) -> Self {
        let mut counts = HashMap::new();
        for key in all_keys(order) {
            counts.insert(key, [0u64; 3]);
        }
        Self {
            order,
            min_samples,
            counts,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Pre-condition: `prev.len() == order`.
    pub fn update(&mut self, prev: &[Symbol], observed: Symbol) {
        debug_assert_eq!(prev.len(), self.order);
        let entry = self
            .counts
            .entry(prev.to_vec())
            .or_insert([0u64; 3]);
        entry[observed.index()] += 1;
    }

    /// Uniform if the key has fewer than `min_samples` total observations;
    /// otherwise normalized counts (spec §4.2).
    pub fn predict(&self, prev: &[Symbol]) -> Distribution {
        debug_assert_eq!(prev.len(), self.order);
        match self.counts.get(prev) {
            None => Distribution::UNIFORM,
            Some(counts) => {
                let total: u64 = counts.iter().sum();
                if total < self.min_samples as u64 {
                    Distribution::UNIFORM
                } else {
                    Distribution::new(counts[0] as f64, counts[1] as f64, counts[2] as f64)
                        .normalized()
                }
            }
        }
    }

    pub fn snapshot(&self) -> &HashMap<Key, [u64; 3]> {
        &self.counts
    }

    pub fn restore(order: usize, min_samples: u32, counts: HashMap<Key, [u64; 3]>) -> Self {
        let mut table = Self::new(order, min_samples);
        for (k, v) in counts {
            table.counts.insert(k, v);
        }
        table
    }
}

fn all_keys(order: usize) -> Vec<Key> {
    if order == 0 {
        return vec![vec![]];
    }
    let mut keys = vec![vec![]];
    for _ in 0..order {
        let mut next = Vec::with_capacity(keys.len() * 3);
        for k in &keys {
            for s in Symbol::ALL {
                let mut k2 = k.clone();
                k2.push(s);
                next.push(k2);
            }
        }
        keys = next;
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_space_is_complete_for_order_two() {
        let t = NgramTable::new(2, 5);
        assert_eq!(t.snapshot().len(), 9);
    }

    #[test]
    fn under_min_samples_predicts_uniform() {
        let mut t = NgramTable::new(2, 5);
        let key = [Symbol::Rock, Symbol::Paper];
        for _ in 0..4 {
            t.update(&key, Symbol::Rock);
        }
        assert_eq!(t.predict(&key), Distribution::UNIFORM);
    }

    #[test]
    fn at_min_samples_predicts_from_counts() {
        let mut t = NgramTable::new(2, 5);
        let key = [Symbol::Rock, Symbol::Paper];
        for _ in 0..5 {
            t.update(&key, Symbol::Rock);
        }
        let d = t.predict(&key);
        assert!((d.rock - 1.0).abs() < 1e-12);
    }
}
