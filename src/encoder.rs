//! This module converts rule sets to and from the human-readable rule notation shown in
//! the rule editor and diagnostics: one `pattern → replacement` rule per line.

use crate::parser::parse_rule_line;
use crate::types::{Rule, RuleSet, System};

/// Encodes a rule set as rule notation, one rule per line.
pub fn encode(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(Rule::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes rule notation leniently.
///
/// Every line is parsed on its own and lines that do not form a valid rule are
/// dropped without error, so a half-typed edit still yields the rules that are
/// complete.
pub fn decode(text: &str) -> RuleSet {
    text.lines().filter_map(parse_rule_line).collect()
}

/// Encodes a whole system as a `.lsys` document that [`crate::parser::parse`] accepts.
pub fn encode_system(system: &System) -> String {
    let mut document = format!("name: {}\n", system.name);

    if let Some(seed) = &system.seed {
        document.push_str(&format!("seed: {seed}\n"));
    }

    document.push_str("rules:\n");
    for rule in &system.rules {
        document.push_str(&format!("  {rule}\n"));
    }

    document
}
