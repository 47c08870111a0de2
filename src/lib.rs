//! This crate provides the core logic for discovering and drawing random L-systems.
//! It includes modules for rewriting symbol strings, interpreting them as turtle
//! graphics, generating and searching random rule sets, parsing rule notation and
//! system documents, and driving the tick-by-tick animation pipeline.

pub mod analyzer;
pub mod config;
pub mod driver;
pub mod encoder;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod path;
pub mod presets;
pub mod rewrite;
pub mod search;
pub mod turtle;
pub mod types;

/// Re-exports the `analyze` function and its report types from the analyzer module.
pub use analyzer::{analyze, Analysis, Growth};
/// Re-exports the run-wide `Config`.
pub use config::Config;
/// Re-exports the animation pipeline from the driver module.
pub use driver::{Animation, Frame, Phase};
/// Re-exports the rule notation functions from the encoder module.
pub use encoder::{decode, encode, encode_system};
/// Re-exports the random generators.
pub use generator::{random_rule, random_rule_set};
/// Re-exports the `SystemLoader` struct from the loader module.
pub use loader::SystemLoader;
/// Re-exports the `parse` function from the parser module.
pub use parser::{parse, parse_rule_line};
/// Re-exports the path formatting functions.
pub use path::{bounds, to_path_data, to_svg, ViewBox};
/// Re-exports `PresetManager` and `PRESETS` from the presets module.
pub use presets::{PresetManager, PRESETS};
/// Re-exports the rewrite engine.
pub use rewrite::{apply_rule, apply_rule_set, iterate, Rewriter};
/// Re-exports the acceptance search.
pub use search::{discover, is_live, search, Discovery};
/// Re-exports the turtle interpreter.
pub use turtle::{Turtle, TurtleState};
/// Re-exports the core types.
pub use types::{Halt, LsysError, Point, Rule, RuleSet, Segment, Symbol, System, Tick, ALPHABET};
