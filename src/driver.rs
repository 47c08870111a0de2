//! This module defines the `Animation` struct, the per-tick pipeline behind every
//! front-end. Each tick derives the program at the next depth from the seed, interprets
//! it and either yields a frame or halts.
//!
//! ```text
//! Idle -> Running --tick--> Frame
//!                 \-------> Halted(DisplayOverflow | Err(GrowthLimitExceeded))
//! ```
//!
//! A halted animation stays halted until its rules are replaced or it is restarted.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::encoder::encode;
use crate::path::{bounds, ViewBox};
use crate::rewrite::Rewriter;
use crate::turtle::Turtle;
use crate::types::{Halt, RuleSet, Segment, Tick};

/// Everything a render target needs to draw one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub depth: usize,
    pub program: String,
    pub segments: Vec<Segment>,
    /// `None` when the program draws nothing.
    pub bounds: Option<ViewBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// No tick has run since the rules were set.
    Idle,
    Running,
    Halted(Halt),
}

pub struct Animation {
    config: Config,
    turtle: Turtle,
    seed: String,
    rules: Arc<RuleSet>,
    depth: usize,
    phase: Phase,
    program: String,
}

impl Animation {
    /// Creates an animation over `rules`, starting from the configured seed.
    pub fn new(config: Config, rules: RuleSet) -> Self {
        let seed = config.seed.clone();
        Self::with_seed(config, rules, seed)
    }

    /// Creates an animation that starts from `seed` instead of the configured seed.
    pub fn with_seed(config: Config, rules: RuleSet, seed: impl Into<String>) -> Self {
        let seed = seed.into();

        Self {
            turtle: config.turtle(),
            config,
            program: seed.clone(),
            seed,
            rules: Arc::new(rules),
            depth: 0,
            phase: Phase::Idle,
        }
    }

    /// Advances the depth by one and runs the full pipeline.
    ///
    /// # Returns
    ///
    /// * `Tick::Frame(_)` with the new program and its path.
    /// * `Tick::Halt(_)` if the path overflowed the segment cap or a rule application
    ///   exceeded the growth limit. Every later tick returns the same halt.
    pub fn tick(&mut self) -> Tick {
        if let Phase::Halted(halt) = &self.phase {
            return Tick::Halt(halt.clone());
        }

        // Keep the rules alive for this tick even if they are replaced meanwhile.
        let rules = Arc::clone(&self.rules);
        let depth = self.depth + 1;
        self.phase = Phase::Running;

        let rewriter = Rewriter::new(&rules, self.config.growth_limit);
        let program = match rewriter.derive(&self.seed, depth) {
            Ok(program) => program,
            Err(e) => {
                self.depth = depth;
                return self.halt(Halt::Err(e));
            }
        };

        let segments = self.turtle.interpret(&program);
        self.depth = depth;
        self.program = program;

        if segments.len() > self.config.segment_cap {
            return self.halt(Halt::DisplayOverflow {
                segments: segments.len(),
                cap: self.config.segment_cap,
            });
        }

        debug!(
            depth,
            symbols = self.program.len(),
            segments = segments.len(),
            "Rendered frame"
        );

        Tick::Frame(Frame {
            depth,
            program: self.program.clone(),
            bounds: bounds(&segments, self.config.margin),
            segments,
        })
    }

    fn halt(&mut self, halt: Halt) -> Tick {
        info!(depth = self.depth, reason = %halt, "Animation halted");
        self.phase = Phase::Halted(halt.clone());
        Tick::Halt(halt)
    }

    /// Replaces the rule set wholesale and restarts from the seed.
    pub fn replace_rules(&mut self, rules: RuleSet) {
        self.rules = Arc::new(rules);
        self.restart();
    }

    /// Returns to depth 0 with the current rules; the next tick renders depth 1.
    pub fn restart(&mut self) {
        self.depth = 0;
        self.phase = Phase::Idle;
        self.program = self.seed.clone();
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.phase, Phase::Halted(_))
    }

    /// The program computed by the last successful rewrite (the seed before any tick).
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Returns a snapshot of the current rule set.
    pub fn rules(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rules)
    }

    /// The current rule set in rule notation.
    pub fn rules_notation(&self) -> String {
        encode(&self.rules)
    }

    /// The halt reason as shown to the user, e.g. `limit exceeded`.
    pub fn last_error(&self) -> Option<String> {
        match &self.phase {
            Phase::Halted(halt) => Some(halt.to_string()),
            _ => None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LsysError, Rule};

    fn rule(pattern: &str, replacement: &str) -> Rule {
        Rule::new(pattern, replacement).unwrap()
    }

    fn frame(tick: Tick) -> Frame {
        match tick {
            Tick::Frame(frame) => frame,
            Tick::Halt(halt) => panic!("Expected a frame, but got {:?}", halt),
        }
    }

    #[test]
    fn test_animation_creation() {
        let animation = Animation::new(Config::default(), vec![rule("f", "f+f")]);
        assert_eq!(animation.depth(), 0);
        assert_eq!(animation.phase(), &Phase::Idle);
        assert_eq!(animation.program(), "f");
        assert_eq!(animation.rules_notation(), "f → f+f");
        assert_eq!(animation.last_error(), None);
    }

    #[test]
    fn test_ticks_increase_depth() {
        let mut animation = Animation::new(Config::default(), vec![rule("f", "f+f")]);

        let first = frame(animation.tick());
        assert_eq!(first.depth, 1);
        assert_eq!(first.program, "f+f");
        assert_eq!(first.segments.len(), 2);
        assert!(first.bounds.is_some());

        let second = frame(animation.tick());
        assert_eq!(second.depth, 2);
        assert_eq!(second.program, "f+f+f+f");
        assert_eq!(animation.phase(), &Phase::Running);
        assert_eq!(animation.program(), "f+f+f+f");
    }

    #[test]
    fn test_frame_without_segments_has_no_bounds() {
        let mut animation = Animation::new(Config::default(), vec![rule("f", "x")]);
        let frame = frame(animation.tick());
        assert!(frame.segments.is_empty());
        assert_eq!(frame.bounds, None);
    }

    #[test]
    fn test_display_overflow_halts() {
        let config = Config {
            segment_cap: 4,
            ..Config::default()
        };
        let mut animation = Animation::new(config, vec![rule("f", "ff")]);

        frame(animation.tick()); // 2 segments
        frame(animation.tick()); // 4 segments

        let halt = Halt::DisplayOverflow {
            segments: 8,
            cap: 4,
        };
        assert_eq!(animation.tick(), Tick::Halt(halt.clone()));
        assert!(animation.is_halted());
        assert_eq!(animation.depth(), 3);

        // Halted is terminal until the rules change.
        assert_eq!(animation.tick(), Tick::Halt(halt));
        assert_eq!(animation.depth(), 3);
    }

    #[test]
    fn test_growth_limit_halts_with_message() {
        let config = Config {
            growth_limit: 3,
            ..Config::default()
        };
        let mut animation = Animation::new(config, vec![rule("f", "ff")]);

        frame(animation.tick()); // 1 replacement
        frame(animation.tick()); // 2 replacements
        let tick = animation.tick(); // 4 replacements

        assert_eq!(
            tick,
            Tick::Halt(Halt::Err(LsysError::GrowthLimitExceeded { limit: 3 }))
        );
        assert_eq!(animation.last_error().as_deref(), Some("limit exceeded"));
        assert_eq!(animation.program(), "ffff");
    }

    #[test]
    fn test_replace_rules_restarts() {
        let config = Config {
            segment_cap: 1,
            ..Config::default()
        };
        let mut animation = Animation::new(config, vec![rule("f", "ff")]);
        assert!(matches!(animation.tick(), Tick::Halt(_)));

        animation.replace_rules(vec![rule("f", "g")]);
        assert_eq!(animation.phase(), &Phase::Idle);
        assert_eq!(animation.depth(), 0);

        let frame = frame(animation.tick());
        assert_eq!(frame.depth, 1);
        assert_eq!(frame.program, "g");
    }

    #[test]
    fn test_restart_keeps_rules() {
        let mut animation = Animation::new(Config::default(), vec![rule("f", "f+f")]);
        animation.tick();
        animation.tick();
        animation.restart();

        assert_eq!(animation.depth(), 0);
        assert_eq!(animation.program(), "f");
        assert_eq!(frame(animation.tick()).program, "f+f");
    }

    #[test]
    fn test_rule_snapshot_survives_replacement() {
        let mut animation = Animation::new(Config::default(), vec![rule("f", "f+f")]);
        let snapshot = animation.rules();
        animation.replace_rules(vec![rule("g", "f")]);

        assert_eq!(snapshot.as_slice(), &[rule("f", "f+f")]);
        assert_eq!(animation.rules().as_slice(), &[rule("g", "f")]);
    }

    #[test]
    fn test_custom_seed() {
        let mut animation = Animation::with_seed(Config::default(), vec![rule("g", "gf")], "g");
        assert_eq!(animation.seed(), "g");
        assert_eq!(frame(animation.tick()).program, "gf");
    }

    #[test]
    fn test_empty_rules_keep_the_seed() {
        let mut animation = Animation::new(Config::default(), vec![]);
        for depth in 1..=3 {
            let frame = frame(animation.tick());
            assert_eq!(frame.depth, depth);
            assert_eq!(frame.program, "f");
        }
    }
}
