//! This module defines the core data structures and types used throughout the L-system
//! engine, including the symbol alphabet, rewrite rules, turtle geometry and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::parser::Rule as GrammarRule;

/// Every symbol a program string may contain.
pub const ALPHABET: &str = "fg+-xy";
/// The separator between a rule's pattern and its replacement in rule notation.
pub const RULE_SEPARATOR: &str = "→";
/// The maximum allowed size for a system document in bytes.
pub const MAX_SYSTEM_SIZE: usize = 65536; // 64KB

/// A single turtle command.
///
/// The alphabet is closed: [`Symbol::from_char`] rejects anything that is not one of
/// the characters in [`ALPHABET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    /// `f`: move forward and draw a segment.
    Draw,
    /// `g`: move forward without drawing.
    Move,
    /// `+`: turn left by the turn angle.
    Left,
    /// `-`: turn right by the turn angle.
    Right,
    /// `x` or `y`: placeholders that only take part in rewriting.
    Inert(char),
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(Symbol::Draw),
            'g' => Some(Symbol::Move),
            '+' => Some(Symbol::Left),
            '-' => Some(Symbol::Right),
            'x' | 'y' => Some(Symbol::Inert(c)),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Symbol::Draw => 'f',
            Symbol::Move => 'g',
            Symbol::Left => '+',
            Symbol::Right => '-',
            Symbol::Inert(c) => *c,
        }
    }
}

/// Returns true if every character of `text` belongs to the alphabet.
pub fn is_program(text: &str) -> bool {
    text.chars().all(|c| Symbol::from_char(c).is_some())
}

/// A literal rewrite rule: every occurrence of `pattern` becomes `replacement`.
///
/// Rules can only be built through [`Rule::new`], which guarantees that both sides
/// are non-empty and that the rule does not map its pattern to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct Rule {
    pattern: String,
    replacement: String,
}

#[derive(Deserialize)]
struct RawRule {
    pattern: String,
    replacement: String,
}

impl TryFrom<RawRule> for Rule {
    type Error = LsysError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        Rule::new(raw.pattern, raw.replacement)
    }
}

impl Rule {
    pub fn new(
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<Self, LsysError> {
        let pattern = pattern.into();
        let replacement = replacement.into();

        if pattern.is_empty() || replacement.is_empty() {
            return Err(LsysError::ValidationError(format!(
                "Rule sides must not be empty: {pattern:?} {RULE_SEPARATOR} {replacement:?}"
            )));
        }

        if pattern == replacement {
            return Err(LsysError::ValidationError(format!(
                "Rule maps {pattern} to itself"
            )));
        }

        Ok(Self {
            pattern,
            replacement,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {RULE_SEPARATOR} {}", self.pattern, self.replacement)
    }
}

/// An ordered list of rules applied as a left-to-right pipeline within one rewrite step.
pub type RuleSet = Vec<Rule>;

/// A named system, as stored in a `.lsys` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    /// The seed program. `None` means the configured default seed.
    pub seed: Option<String>,
    pub rules: RuleSet,
}

impl System {
    /// Returns the system's own seed, falling back to `default`.
    pub fn seed_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.seed.as_deref().unwrap_or(default)
    }
}

/// A point in the turtle's plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One drawn unit of turtle movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Represents the outcome of one animation tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// The program was rewritten and interpreted; the frame is ready to draw.
    Frame(crate::driver::Frame),
    /// The animation has stopped and will not advance until the rules change.
    Halt(Halt),
}

/// Why an animation stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The path grew past the segment display cap.
    DisplayOverflow { segments: usize, cap: usize },

    Err(LsysError),
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::DisplayOverflow { segments, cap } => {
                write!(f, "too many segments ({segments} > {cap})")
            }
            Halt::Err(e) => write!(f, "{e}"),
        }
    }
}

/// Represents various errors that can occur during L-system operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LsysError {
    /// A single rule application performed more replacements than allowed.
    #[error("limit exceeded")]
    GrowthLimitExceeded { limit: usize },
    /// The acceptance search gave up without finding a live rule set.
    #[error("No live rule set found after {0} attempts")]
    SearchExhausted(usize),
    /// Indicates an error during the parsing of a system document.
    #[error("System parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<GrammarRule>>),
    /// Indicates a structurally invalid rule or system.
    #[error("System validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates an unreadable or malformed configuration file.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
