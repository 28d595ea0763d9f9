//! The CTW tree itself: growth, the two predictors, and reset (spec §4.1).

use super::node::CtwNode;
use crate::symbol::{Distribution, Symbol};
use crate::{PredictorError, HISTORY_TRIM_FACTOR};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct CtwModel {
    pub max_depth: usize,
    pub root: CtwNode,
    /// Most-recent-last. Trimmed to `10 * max_depth` after every update.
    pub history: VecDeque<Symbol>,
}

impl CtwModel {
    /// Pre-condition: `max_depth >= 1`.
    pub fn new(max_depth: usize) -> Self {
        assert!(max_depth >= 1, "max_depth must be >= 1");
        Self {
            max_depth,
            root: CtwNode::new(),
            history: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The current context: the last `min(max_depth, |history|)` symbols,
    /// most-recent-first (spec §3 "Context").
    fn current_context(&self) -> Vec<Symbol> {
        let depth = self.max_depth.min(self.history.len());
        self.history.iter().rev().take(depth).copied().collect()
    }

    /// Incorporates one observation (spec §4.1). Unknown symbols can't
    /// reach this function since `Symbol` is a closed enum; malformed input
    /// from string parsing is rejected earlier at the `FromStr` boundary
    /// (spec §7 BadInput), so `update` itself cannot fail.
    pub fn update(&mut self, s: Symbol) {
        let context = self.current_context();
        // Traverse root -> ... -> deepest node along the context path,
        // collecting mutable references front-to-back isn't possible with
        // a single borrow, so we recurse instead: observe this node with
        // the pre-update KT probability, then descend.
        Self::update_path(&mut self.root, &context, s);

        self.history.push_back(s);
        let cap = HISTORY_TRIM_FACTOR * self.max_depth;
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }

    /// Walks `context` (most-recent-first) from `node`, growing children as
    /// needed, observes `s` at every node on the path (root included), then
    /// recomputes `pw` bottom-up on the way back out, and rescales if `pe`
    /// or `pw` threatens underflow.
    fn update_path(node: &mut CtwNode, context: &[Symbol], s: Symbol) {
        match context.split_first() {
            None => {
                node.observe(s);
                node.recompute_pw();
                node.rescale_if_needed();
            }
            Some((&head, rest)) => {
                let child = node.child_or_insert(head);
                Self::update_path(child, rest, s);
                node.observe(s);
                node.recompute_pw();
                node.rescale_if_needed();
            }
        }
    }

    /// Uniform with zero history; otherwise the KT distribution at the
    /// deepest reachable node along the current context (spec §4.1). This is
    /// what the repository's hot path (`getBestMove`-equivalent) uses.
    pub fn predict(&self) -> Distribution {
        if self.history.is_empty() {
            return Distribution::UNIFORM;
        }
        let context = self.current_context();
        let mut node = &self.root;
        for &s in &context {
            match node.child(s) {
                Some(child) => node = child,
                None => break,
            }
        }
        node.kt_distribution()
    }

    /// Combines the KT distributions at *every* node on the current context
    /// path, weighted by `0.5^(depth_from_deepest) * (node.total + 1)`,
    /// normalized (spec §4.1 `predict_weighted`).
    pub fn predict_weighted(&self) -> Distribution {
        if self.history.is_empty() {
            return Distribution::UNIFORM;
        }
        let context = self.current_context();
        let mut path = vec![&self.root];
        let mut node = &self.root;
        for &s in &context {
            match node.child(s) {
                Some(child) => {
                    path.push(child);
                    node = child;
                }
                None => break,
            }
        }
        let deepest = path.len() - 1;
        let mut acc = [0.0f64; 3];
        let mut weight_total = 0.0;
        for (depth, n) in path.iter().enumerate() {
            let depth_from_deepest = deepest - depth;
            let weight = 0.5f64.powi(depth_from_deepest as i32) * (n.total as f64 + 1.0);
            let d = n.kt_distribution();
            for (acc_s, p) in acc.iter_mut().zip(d.as_array()) {
                *acc_s += weight * p;
            }
            weight_total += weight;
        }
        if weight_total <= 0.0 {
            return Distribution::UNIFORM;
        }
        Distribution::from_array(acc).scaled(1.0 / weight_total).normalized()
    }

    pub fn reset(&mut self) {
        self.root = CtwNode::new();
        self.history.clear();
    }

    pub fn cold_start(&self) -> bool {
        self.history.len() < self.max_depth.max(2)
    }
}

/// Unknown-symbol input never panics (spec §4.1 failure modes); this is the
/// typed entry point callers use when symbols arrive as free-form strings.
pub fn update_from_str(model: &mut CtwModel, raw: &str) -> Result<(), PredictorError> {
    let s: Symbol = raw.parse()?;
    model.update(s);
    Ok(())
}
