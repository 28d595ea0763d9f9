//! A single node in the Context Tree Weighting tree (spec §3 "CTW node").

use crate::symbol::Symbol;
use crate::{KT_SMOOTHING, PE_RESCALE_FACTOR, PE_UNDERFLOW_THRESHOLD};

/// `(counts[s] + 1/2) / (total + 3/2)`, the Krichevsky-Trofimov estimator
/// for a 3-symbol alphabet (spec §3, §4.1).
pub fn kt_probability(counts: &[u64; 3], total: u64, s: Symbol) -> f64 {
    (counts[s.index()] as f64 + KT_SMOOTHING) / (total as f64 + 3.0 * KT_SMOOTHING)
}

pub fn kt_distribution(counts: &[u64; 3], total: u64) -> crate::symbol::Distribution {
    crate::symbol::Distribution::new(
        kt_probability(counts, total, Symbol::Rock),
        kt_probability(counts, total, Symbol::Paper),
        kt_probability(counts, total, Symbol::Scissor),
    )
}

#[derive(Debug, Clone)]
pub struct CtwNode {
    pub counts: [u64; 3],
    pub total: u64,
    pub pe: f64,
    pub pw: f64,
    /// Sparse children, indexed by `Symbol::index()`. `None` when a branch
    /// has never been observed. `src/persistence/schema.rs` converts this to
    /// and from a present-keys-only JSON map, rather than deriving `Serialize`
    /// directly on this runtime type.
    pub children: [Option<Box<CtwNode>>; 3],
}

impl Default for CtwNode {
    fn default() -> Self {
        Self::new()
    }
}

impl CtwNode {
    pub fn new() -> Self {
        Self {
            counts: [0, 0, 0],
            total: 0,
            pe: 1.0,
            pw: 1.0,
            children: [None, None, None],
        }
    }

    pub fn child(&self, s: Symbol) -> Option<&CtwNode> {
        self.children[s.index()].as_deref()
    }

    pub fn child_mut(&mut self, s: Symbol) -> Option<&mut CtwNode> {
        self.children[s.index()].as_deref_mut()
    }

    pub fn child_or_insert(&mut self, s: Symbol) -> &mut CtwNode {
        self.children[s.index()].get_or_insert_with(|| Box::new(CtwNode::new()))
    }

    pub fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    pub fn kt_next(&self, s: Symbol) -> f64 {
        kt_probability(&self.counts, self.total, s)
    }

    pub fn kt_distribution(&self) -> crate::symbol::Distribution {
        kt_distribution(&self.counts, self.total)
    }

    /// Records one observation of `s` *at this node*: the `pe` update uses
    /// the KT probability computed from the pre-update counts (spec §4.1),
    /// then the count is incremented.
    pub fn observe(&mut self, s: Symbol) {
        let p = self.kt_next(s);
        self.pe *= p;
        self.counts[s.index()] += 1;
        self.total += 1;
    }

    /// `pw = 1/2 * pe + 1/2 * prod(children.pw)` at an internal node;
    /// `pw = pe` at a leaf (spec §3 invariant).
    pub fn recompute_pw(&mut self) {
        if !self.has_children() {
            self.pw = self.pe;
            return;
        }
        let children_product: f64 = self
            .children
            .iter()
            .filter_map(|c| c.as_ref())
            .map(|c| c.pw)
            .product();
        self.pw = 0.5 * self.pe + 0.5 * children_product;
    }

    /// If `pe` or `pw` threatens underflow, rescale both by the same large
    /// constant so their ratio (and therefore arg-max behaviour) is
    /// unaffected (spec §3 invariant on underflow).
    pub fn rescale_if_needed(&mut self) {
        if self.pe < PE_UNDERFLOW_THRESHOLD || self.pw < PE_UNDERFLOW_THRESHOLD {
            self.pe *= PE_RESCALE_FACTOR;
            self.pw *= PE_RESCALE_FACTOR;
        }
    }

    /// Recomputes `total` from `counts`, the release-build self-heal spec §7
    /// calls for in place of a debug-only assertion.
    pub fn heal_total(&mut self) {
        self.total = self.counts.iter().sum();
    }
}
