//! This module implements the rewrite engine: literal, global, non-overlapping
//! replacement of a rule's pattern, the rule-set pipeline that makes up one rewrite
//! step, and repeated application of a step to a seed.

use crate::types::{LsysError, Rule};

/// Replaces every non-overlapping occurrence of `rule.pattern()` in `text`, scanning
/// left to right once.
///
/// # Returns
///
/// * `Ok(String)` with the rewritten text. A pattern that does not occur is a no-op.
/// * `Err(LsysError::GrowthLimitExceeded)` if more than `limit` replacements would be made.
pub fn apply_rule(text: &str, rule: &Rule, limit: usize) -> Result<String, LsysError> {
    let pattern = rule.pattern();
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut count = 0;

    while let Some(index) = rest.find(pattern) {
        count += 1;
        if count > limit {
            return Err(LsysError::GrowthLimitExceeded { limit });
        }

        output.push_str(&rest[..index]);
        output.push_str(rule.replacement());
        rest = &rest[index + pattern.len()..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Applies each rule in order, feeding the output of one rule into the next.
///
/// This is one rewrite step. It is neither a simultaneous substitution nor iterated to
/// a fixed point.
pub fn apply_rule_set(text: &str, rules: &[Rule], limit: usize) -> Result<String, LsysError> {
    rules
        .iter()
        .try_fold(text.to_string(), |acc, rule| apply_rule(&acc, rule, limit))
}

/// Applies `step` to `seed` `times` times and returns the final string.
pub fn iterate<F>(times: usize, seed: &str, mut step: F) -> Result<String, LsysError>
where
    F: FnMut(&str) -> Result<String, LsysError>,
{
    let mut value = seed.to_string();
    for _ in 0..times {
        value = step(&value)?;
    }

    Ok(value)
}

/// Counts the non-overlapping occurrences of `pattern` in `text`, left to right.
pub fn count_matches(text: &str, pattern: &str) -> usize {
    if pattern.is_empty() {
        return 0;
    }

    text.matches(pattern).count()
}

/// A rule set bound to a growth limit.
///
/// The rewriter borrows a snapshot of the rules, so a caller replacing its rule set
/// never affects a derivation already in progress.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    rules: &'a [Rule],
    limit: usize,
}

impl<'a> Rewriter<'a> {
    pub fn new(rules: &'a [Rule], limit: usize) -> Self {
        Self { rules, limit }
    }

    /// Performs one rewrite step.
    pub fn step(&self, text: &str) -> Result<String, LsysError> {
        apply_rule_set(text, self.rules, self.limit)
    }

    /// Rewrites `seed` `depth` times.
    pub fn derive(&self, seed: &str, depth: usize) -> Result<String, LsysError> {
        iterate(depth, seed, |text| self.step(text))
    }

    pub fn rules(&self) -> &'a [Rule] {
        self.rules
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
