//! This module provides diagnostics for a rule set on a seed: which rules fire, whether
//! the liveness predicate holds, and whether the derivation settles into a fixed point
//! within a bounded depth.
//!
//! None of this feeds back into the acceptance search. A live rule set can still stall
//! at a later depth; the analysis only reports it.

use serde::Serialize;

use crate::rewrite::{count_matches, Rewriter};
use crate::search::is_live;
use crate::types::{LsysError, Rule};

/// How a derivation behaved within the analysed depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Growth {
    /// The program kept changing up to the analysed depth.
    Growing,
    /// The program at `depth` equals the program at `depth - 1`.
    FixedPoint { depth: usize },
    /// A rule application exceeded the growth limit at `depth`.
    LimitExceeded { depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: String,
    /// Occurrences of the rule's pattern in the seed.
    pub seed_matches: usize,
    /// Occurrences of the rule's pattern after one rewrite step, `None` if that step
    /// exceeded the growth limit.
    pub step_matches: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub live: bool,
    pub rules: Vec<RuleReport>,
    pub growth: Growth,
    /// Program length at each depth from 0 up to where the analysis stopped.
    pub lengths: Vec<usize>,
}

/// Analyzes `rules` on `seed` up to `max_depth` rewrite steps.
pub fn analyze(seed: &str, rules: &[Rule], max_depth: usize, limit: usize) -> Analysis {
    let rewriter = Rewriter::new(rules, limit);
    let first_step = rewriter.step(seed).ok();

    let reports = rules
        .iter()
        .map(|rule| RuleReport {
            rule: rule.to_string(),
            seed_matches: count_matches(seed, rule.pattern()),
            step_matches: first_step
                .as_deref()
                .map(|step| count_matches(step, rule.pattern())),
        })
        .collect();

    let (growth, lengths) = trace_growth(&rewriter, seed, max_depth);

    Analysis {
        live: is_live(seed, rules, limit),
        rules: reports,
        growth,
        lengths,
    }
}

fn trace_growth(rewriter: &Rewriter, seed: &str, max_depth: usize) -> (Growth, Vec<usize>) {
    let mut lengths = vec![seed.len()];
    let mut program = seed.to_string();

    for depth in 1..=max_depth {
        let next = match rewriter.step(&program) {
            Ok(next) => next,
            Err(LsysError::GrowthLimitExceeded { .. }) => {
                return (Growth::LimitExceeded { depth }, lengths)
            }
            Err(_) => break,
        };

        lengths.push(next.len());
        if next == program {
            return (Growth::FixedPoint { depth }, lengths);
        }
        program = next;
    }

    (Growth::Growing, lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GROWTH_LIMIT;

    fn rule(pattern: &str, replacement: &str) -> Rule {
        Rule::new(pattern, replacement).unwrap()
    }

    #[test]
    fn test_growing_system() {
        let analysis = analyze("f", &[rule("f", "f+f")], 4, DEFAULT_GROWTH_LIMIT);
        assert!(analysis.live);
        assert_eq!(analysis.growth, Growth::Growing);
        assert_eq!(analysis.lengths, vec![1, 3, 7, 15, 31]);
        assert_eq!(analysis.rules[0].seed_matches, 1);
        assert_eq!(analysis.rules[0].step_matches, Some(2));
    }

    #[test]
    fn test_dead_system_reaches_fixed_point() {
        // f → gx, then x → y, then nothing matches y or g.
        let rules = [rule("f", "gx"), rule("x", "y")];
        let analysis = analyze("f", &rules, 10, DEFAULT_GROWTH_LIMIT);

        assert!(!analysis.live);
        assert_eq!(analysis.growth, Growth::FixedPoint { depth: 2 });
        assert_eq!(analysis.lengths, vec![1, 2, 2]);
    }

    #[test]
    fn test_first_step_live_but_later_fixed_point() {
        // f, ff, g, g: live after one step, stalled from depth 3.
        let rules = [rule("ff", "g"), rule("f", "ff")];
        let analysis = analyze("f", &rules, 10, DEFAULT_GROWTH_LIMIT);

        assert!(analysis.live);
        assert_eq!(analysis.growth, Growth::FixedPoint { depth: 3 });
        assert_eq!(analysis.lengths, vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_pipeline_chain_exhausts_seed() {
        // Within one step f becomes x, then g, then y, which no rule matches.
        let rules = [rule("f", "x"), rule("x", "g"), rule("g", "y")];
        let analysis = analyze("f", &rules, 5, DEFAULT_GROWTH_LIMIT);

        assert!(!analysis.live);
        assert_eq!(analysis.growth, Growth::FixedPoint { depth: 2 });
    }

    #[test]
    fn test_limit_exceeded() {
        let analysis = analyze("f", &[rule("f", "ff")], 10, 4);
        assert_eq!(analysis.growth, Growth::LimitExceeded { depth: 4 });
        assert_eq!(analysis.lengths, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_zero_depth() {
        let analysis = analyze("f", &[rule("f", "ff")], 0, DEFAULT_GROWTH_LIMIT);
        assert_eq!(analysis.growth, Growth::Growing);
        assert_eq!(analysis.lengths, vec![1]);
    }

    #[test]
    fn test_first_step_over_limit_has_no_step_matches() {
        let analysis = analyze("ffff", &[rule("f", "ff")], 3, 3);

        assert!(!analysis.live);
        assert_eq!(analysis.rules[0].seed_matches, 4);
        assert_eq!(analysis.rules[0].step_matches, None);
        assert_eq!(analysis.growth, Growth::LimitExceeded { depth: 1 });
        assert_eq!(analysis.lengths, vec![4]);
    }
}
