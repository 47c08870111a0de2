//! Acceptance search: rejection-samples random rule sets until one is live on the seed.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::generator::random_rule_set;
use crate::rewrite::{apply_rule_set, count_matches};
use crate::types::{LsysError, Rule, RuleSet};

/// A rule set accepted by [`search`], with the number of candidates it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub rules: RuleSet,
    pub attempts: usize,
}

fn any_pattern_in(text: &str, rules: &[Rule]) -> bool {
    rules
        .iter()
        .any(|rule| count_matches(text, rule.pattern()) > 0)
}

/// The liveness predicate.
///
/// Holds when some rule's pattern occurs in `seed` and some rule's pattern occurs in
/// the result of one rewrite step applied to `seed`. It only looks at the first step:
/// a live rule set may still reach a fixed point at a later depth. An empty rule set,
/// or one whose first step exceeds the growth limit, is not live.
pub fn is_live(seed: &str, rules: &[Rule], limit: usize) -> bool {
    if rules.is_empty() || !any_pattern_in(seed, rules) {
        return false;
    }

    match apply_rule_set(seed, rules, limit) {
        Ok(stepped) => any_pattern_in(&stepped, rules),
        Err(_) => false,
    }
}

/// Draws candidate rule sets from `rng` until one is live on `seed`.
///
/// # Returns
///
/// * `Ok(Discovery)` with the first live candidate.
/// * `Err(LsysError::SearchExhausted)` if `max_attempts` candidates were all rejected.
pub fn search<R: Rng + ?Sized>(
    seed: &str,
    rng: &mut R,
    max_attempts: usize,
    limit: usize,
) -> Result<Discovery, LsysError> {
    for attempt in 1..=max_attempts {
        let rules = random_rule_set(rng);
        if is_live(seed, &rules, limit) {
            info!(attempts = attempt, rules = rules.len(), "Discovered live rule set");
            return Ok(Discovery {
                rules,
                attempts: attempt,
            });
        }

        debug!(attempt, "Rejected candidate rule set");
    }

    warn!(max_attempts, seed, "Acceptance search exhausted");
    Err(LsysError::SearchExhausted(max_attempts))
}

/// Runs [`search`] with the thread-local generator and the limits from `config`.
pub fn discover(config: &Config) -> Result<Discovery, LsysError> {
    search(
        &config.seed,
        &mut rand::thread_rng(),
        config.search_attempts,
        config.growth_limit,
    )
}
