//! The 3-symbol alphabet and the distribution type the rest of the crate
//! predicts over.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rock/paper/scissor tag. The 0/1/2 encoding is part of the on-disk format
/// (spec §3 "Symbol") and must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Rock = 0,
    Paper = 1,
    Scissor = 2,
}

impl Symbol {
    pub const ALL: [Symbol; 3] = [Symbol::Rock, Symbol::Paper, Symbol::Scissor];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Symbol::Rock),
            1 => Some(Symbol::Paper),
            2 => Some(Symbol::Scissor),
            _ => None,
        }
    }

    /// What this symbol loses to, i.e. the symbol we'd need to play to beat it.
    /// `counter(x)` is "our counter" in spec §3's terms.
    pub fn counter(self) -> Symbol {
        match self {
            Symbol::Rock => Symbol::Paper,
            Symbol::Paper => Symbol::Scissor,
            Symbol::Scissor => Symbol::Rock,
        }
    }

    /// The symbol that `self` beats.
    pub fn beats(self) -> Symbol {
        match self {
            Symbol::Rock => Symbol::Scissor,
            Symbol::Paper => Symbol::Rock,
            Symbol::Scissor => Symbol::Paper,
        }
    }

    /// The symbol that beats `self`.
    pub fn loses_to(self) -> Symbol {
        self.counter()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Symbol::Rock => "rock",
            Symbol::Paper => "paper",
            Symbol::Scissor => "scissor",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Symbol {
    type Err = crate::PredictorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rock" | "r" => Ok(Symbol::Rock),
            "paper" | "p" => Ok(Symbol::Paper),
            "scissor" | "scissors" | "s" => Ok(Symbol::Scissor),
            other => Err(crate::PredictorError::BadInput {
                reason: format!("unknown symbol: {other}"),
            }),
        }
    }
}

/// A probability distribution over `{rock, paper, scissor}`. Always kept
/// normalized to sum to 1 (within float tolerance) by its constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub rock: f64,
    pub paper: f64,
    pub scissor: f64,
}

impl Distribution {
    pub const UNIFORM: Distribution = Distribution {
        rock: 1.0 / 3.0,
        paper: 1.0 / 3.0,
        scissor: 1.0 / 3.0,
    };

    pub fn new(rock: f64, paper: f64, scissor: f64) -> Self {
        Self {
            rock,
            paper,
            scissor,
        }
    }

    pub fn from_array(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.rock, self.paper, self.scissor]
    }

    pub fn get(&self, s: Symbol) -> f64 {
        match s {
            Symbol::Rock => self.rock,
            Symbol::Paper => self.paper,
            Symbol::Scissor => self.scissor,
        }
    }

    pub fn sum(&self) -> f64 {
        self.rock + self.paper + self.scissor
    }

    /// Renormalize so the three entries sum to 1. Falls back to uniform if
    /// the total is non-positive (defensive only; callers should never feed
    /// an all-zero distribution in).
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            Self::UNIFORM
        } else {
            Self::new(self.rock / total, self.paper / total, self.scissor / total)
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.rock * factor, self.paper * factor, self.scissor * factor)
    }

    pub fn added(&self, other: &Self) -> Self {
        Self::new(
            self.rock + other.rock,
            self.paper + other.paper,
            self.scissor + other.scissor,
        )
    }

    /// `max(p) - 1/3`, clamped to `[0, 1]` then renormalized into `[0, 1]`
    /// by its own max range (spec §6 "confidence").
    pub fn confidence(&self) -> f64 {
        let max = self.rock.max(self.paper).max(self.scissor);
        let raw = (max - 1.0 / 3.0).max(0.0);
        // max possible value of (max - 1/3) is (1 - 1/3) = 2/3
        (raw / (2.0 / 3.0)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_cycle_is_well_founded() {
        assert_eq!(Symbol::Rock.counter(), Symbol::Paper);
        assert_eq!(Symbol::Paper.counter(), Symbol::Scissor);
        assert_eq!(Symbol::Scissor.counter(), Symbol::Rock);
    }

    #[test]
    fn beats_and_loses_to_are_inverses() {
        for s in Symbol::ALL {
            assert_eq!(s.beats().loses_to(), s);
        }
    }

    #[test]
    fn distribution_normalizes() {
        let d = Distribution::new(2.0, 2.0, 0.0).normalized();
        assert!((d.sum() - 1.0).abs() < 1e-12);
        assert!((d.rock - 0.5).abs() < 1e-12);
    }

    #[test]
    fn confidence_is_zero_at_uniform() {
        assert!(Distribution::UNIFORM.confidence() < 1e-9);
    }

    #[test]
    fn confidence_is_one_at_certainty() {
        let d = Distribution::new(1.0, 0.0, 0.0);
        assert!((d.confidence() - 1.0).abs() < 1e-9);
    }
}
