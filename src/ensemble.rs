//! Blend CTW + n-gram, apply the charge bias, and pick our move by expected
//! value (spec §4.3).

use crate::charges::Charges;
use crate::config::EnsembleWeights;
use crate::symbol::{Distribution, Symbol};

/// Step 1: `p = w_ctw * p_ctw + w_ngram * p_ngram`.
pub fn blend(p_ctw: Distribution, p_ngram: Distribution, weights: EnsembleWeights) -> Distribution {
    p_ctw.scaled(weights.w_ctw).added(&p_ngram.scaled(weights.w_ngram))
}

/// Step 2: if the charge gate trips, `p <- (1 - charge_weight)*p + charge_weight*q`.
/// A no-op otherwise.
pub fn apply_charge_bias(
    p: Distribution,
    charges: Option<Charges>,
    trigger_gap: u32,
    charge_weight: f64,
) -> Distribution {
    match charges {
        Some(c) if c.triggers(trigger_gap) => {
            let q = c.as_distribution();
            p.scaled(1.0 - charge_weight).added(&q.scaled(charge_weight))
        }
        _ => p,
    }
}

/// `EV(m) = p[beats(m)] - p[loses_to(m)]` for each candidate move (spec
/// §4.3 step 3): the probability mass on the symbol `m` would beat, minus
/// the mass on the symbol that beats `m`.
pub fn expected_values(p: Distribution) -> [(Symbol, f64); 3] {
    [
        (Symbol::Rock, p.get(Symbol::Rock.beats()) - p.get(Symbol::Rock.loses_to())),
        (Symbol::Paper, p.get(Symbol::Paper.beats()) - p.get(Symbol::Paper.loses_to())),
        (Symbol::Scissor, p.get(Symbol::Scissor.beats()) - p.get(Symbol::Scissor.loses_to())),
    ]
}

/// `argmax_m EV(m)`, tie-broken in insertion order rock -> paper -> scissor
/// (spec §4.3): the first maximum encountered wins, never a hash-order pick.
pub fn choose_move(p: Distribution) -> Symbol {
    let evs = expected_values(p);
    let mut best = evs[0];
    for &(sym, ev) in &evs[1..] {
        if ev > best.1 {
            best = (sym, ev);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ev_determinism_on_uniform_distribution() {
        // All three EVs are 0 on a uniform distribution; rock must win the tie.
        assert_eq!(choose_move(Distribution::UNIFORM), Symbol::Rock);
    }

    #[test]
    fn ev_picks_the_counter_of_the_modal_symbol() {
        let p = Distribution::new(0.9, 0.05, 0.05);
        // Opponent likely plays rock, so we should play paper.
        assert_eq!(choose_move(p), Symbol::Paper);
    }

    #[test]
    fn charge_gate_shifts_rock_mass_by_exact_amount() {
        let p = Distribution::new(0.1, 0.8, 0.1);
        let charges = Charges::new(3, 0, 0);
        let biased = apply_charge_bias(p, Some(charges), 3, 0.2);
        let expected_rock = 0.8 * p.rock + 0.2 * 1.0;
        assert!((biased.rock - expected_rock).abs() < 1e-12);
    }

    #[test]
    fn charge_gate_no_op_below_threshold() {
        let p = Distribution::new(0.1, 0.8, 0.1);
        let charges = Charges::new(2, 1, 0);
        let biased = apply_charge_bias(p, Some(charges), 3, 0.2);
        assert_eq!(biased, p);
    }

    #[test]
    fn blend_weights_sum_preserved() {
        let p_ctw = Distribution::new(0.5, 0.3, 0.2);
        let p_ngram = Distribution::new(0.2, 0.2, 0.6);
        let weights = EnsembleWeights {
            w_ctw: 0.2,
            w_ngram: 0.8,
        };
        let blended = blend(p_ctw, p_ngram, weights);
        assert!((blended.sum() - 1.0).abs() < 1e-12);
    }
}
