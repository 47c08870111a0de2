//! Random rule and rule-set generation.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Rule, RuleSet};

/// Symbols are drawn uniformly from this table; `f` appears twice so drawn segments
/// are more common than the other commands.
pub const DRAW_TABLE: [char; 7] = ['f', 'f', 'g', '+', '-', 'x', 'y'];

fn random_word<R: Rng + ?Sized>(rng: &mut R, min: usize, max: usize) -> String {
    let len = rng.gen_range(min..=max);
    let mut word = String::with_capacity(len);
    for _ in 0..len {
        if let Some(&symbol) = DRAW_TABLE.choose(rng) {
            word.push(symbol);
        }
    }
    word
}

/// Draws a rule with a 1–2 symbol pattern and a 1–5 symbol replacement.
///
/// Draws where the pattern equals the replacement are discarded and redrawn.
pub fn random_rule<R: Rng + ?Sized>(rng: &mut R) -> Rule {
    loop {
        let pattern = random_word(rng, 1, 2);
        let replacement = random_word(rng, 1, 5);

        if let Ok(rule) = Rule::new(pattern, replacement) {
            return rule;
        }
    }
}

/// Draws 2–5 independent rules. Duplicates are allowed.
pub fn random_rule_set<R: Rng + ?Sized>(rng: &mut R) -> RuleSet {
    let count = rng.gen_range(2..=5);
    (0..count).map(|_| random_rule(rng)).collect()
}
