//! This module provides the parser for L-system documents and rule lines, utilizing the
//! `pest` crate. It defines the grammar for `.lsys` files and the single-line rule
//! notation used by the rule editor.

use crate::types::{self, LsysError, RuleSet, System, MAX_SYSTEM_SIZE};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the L-system grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct SystemParser;

/// Parses the given input string into a `System`.
///
/// This is the strict entry point used for files and presets: any syntax error,
/// duplicated section or self-mapping rule is reported.
///
/// # Arguments
///
/// * `input` - A string slice containing the system document.
///
/// # Returns
///
/// * `Ok(System)` if the input is successfully parsed and validated.
/// * `Err(LsysError::ParseError)` if there are any syntax errors.
/// * `Err(LsysError::ValidationError)` if a required section is missing.
pub fn parse(input: &str) -> Result<System, LsysError> {
    if input.len() > MAX_SYSTEM_SIZE {
        return Err(LsysError::ValidationError(format!(
            "System document is larger than {MAX_SYSTEM_SIZE} bytes"
        )));
    }

    let root = SystemParser::parse(Rule::system, input.trim())
        .map_err(|e| LsysError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| LsysError::ValidationError("Empty system document".to_string()))?;

    parse_system(root)
}

/// Parses one line of rule notation, `pattern → replacement`.
///
/// Returns `None` for anything that is not exactly two non-empty runs of alphabet
/// symbols around a single separator, and for rules that map a pattern to itself.
/// Surrounding whitespace is ignored.
pub fn parse_rule_line(line: &str) -> Option<types::Rule> {
    let line_pair = SystemParser::parse(Rule::rule_line, line.trim())
        .ok()?
        .next()?;
    let production = line_pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::line_production)?;
    let (pattern, replacement) = production_sides(production)?;

    types::Rule::new(pattern, replacement).ok()
}

/// Parses the top-level structure of a system from a `Pair<Rule::system>`.
fn parse_system(pair: Pair<Rule>) -> Result<System, LsysError> {
    let mut name: Option<String> = None;
    let mut seed: Option<String> = None;
    let mut rules: Option<RuleSet> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::seed => seed = Some(parse_inner_string(p)),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // SOI/EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let rules = check_required_rule(rules, "rules")?;

    if rules.is_empty() {
        return Err(LsysError::ValidationError(format!(
            "System '{name}' defines no rules"
        )));
    }

    Ok(System { name, seed, rules })
}

/// Parses the rules section, rejecting any rule that maps its pattern to itself.
fn parse_rules(pair: Pair<Rule>) -> Result<RuleSet, LsysError> {
    let mut rules = Vec::new();

    for production in pair.into_inner() {
        let span = production.as_span();
        let (pattern, replacement) = production_sides(production)
            .ok_or_else(|| parse_error("Incomplete rule", span))?;

        let rule = types::Rule::new(pattern, replacement)
            .map_err(|e| parse_error(&e.to_string(), span))?;
        rules.push(rule);
    }

    Ok(rules)
}

/// Splits a `Pair<Rule::production>` into its pattern and replacement.
fn production_sides(pair: Pair<Rule>) -> Option<(String, String)> {
    let mut pairs = pair.into_inner();
    let pattern = pairs.next()?.as_str().to_string();
    let replacement = pairs.next()?.as_str().to_string();

    Some((pattern, replacement))
}

/// Creates a `LsysError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> LsysError {
    LsysError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Checks if a given section has already been declared.
fn check_unique_rule(rule: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), LsysError> {
    if !matches!(rule, Rule::name | Rule::seed | Rule::rules) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, LsysError> {
    value.ok_or_else(|| LsysError::ValidationError(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_system() {
        let input = r#"
name: Hextooth
rules:
  f → +f---
  + → ff-
"#;

        let system = parse(input).unwrap();
        assert_eq!(system.name, "Hextooth");
        assert_eq!(system.seed, None);
        assert_eq!(system.rules.len(), 2);
        assert_eq!(system.rules[0].pattern(), "f");
        assert_eq!(system.rules[0].replacement(), "+f---");
        assert_eq!(system.rules[1].pattern(), "+");
        assert_eq!(system.rules[1].replacement(), "ff-");
    }

    #[test]
    fn test_parse_with_seed_and_comments() {
        let input = r#"
# a folded strip
name: Folded paper   # trailing note
seed: fgf

rules:
  # first rule
  f → gfg
  g → +f
"#;

        let system = parse(input).unwrap();
        assert_eq!(system.name, "Folded paper");
        assert_eq!(system.seed.as_deref(), Some("fgf"));
        assert_eq!(system.rules.len(), 2);
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First
name: Second
rules:
  f → ff
"#;
        let error = parse(input).unwrap_err();
        assert!(matches!(error, LsysError::ParseError(_)));
        assert!(error.to_string().contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = "rules:\n  f → ff";
        let error = parse(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "System validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_rules() {
        let error = parse("name: Nothing").unwrap_err();
        assert_eq!(
            error.to_string(),
            "System validation error: Missing 'rules' section"
        );
    }

    #[test]
    fn test_parse_empty_rules() {
        let error = parse("name: Empty\nrules:").unwrap_err();
        assert!(matches!(error, LsysError::ValidationError(_)));
        assert!(error.to_string().contains("defines no rules"));
    }

    #[test]
    fn test_parse_identity_rule() {
        let input = "name: Stuck\nrules:\n  f → f";
        let error = parse(input).unwrap_err();
        assert!(matches!(error, LsysError::ParseError(_)));
        assert!(error.to_string().contains("to itself"));
    }

    #[test]
    fn test_parse_symbol_outside_alphabet() {
        let input = "name: Bad\nrules:\n  F → ff";
        assert!(matches!(parse(input), Err(LsysError::ParseError(_))));
    }

    #[test]
    fn test_parse_oversized_document() {
        let input = format!("name: Big\nrules:\n{}", "  f → ff\n".repeat(MAX_SYSTEM_SIZE));
        assert!(matches!(parse(&input), Err(LsysError::ValidationError(_))));
    }

    #[test]
    fn test_rule_line() {
        let rule = parse_rule_line("  f-  →   +ff ").unwrap();
        assert_eq!(rule.pattern(), "f-");
        assert_eq!(rule.replacement(), "+ff");
    }

    #[test]
    fn test_rule_line_rejections() {
        assert_eq!(parse_rule_line(""), None);
        assert_eq!(parse_rule_line("f →"), None);
        assert_eq!(parse_rule_line("→ f"), None);
        assert_eq!(parse_rule_line("f ff"), None);
        assert_eq!(parse_rule_line("f → g → x"), None);
        assert_eq!(parse_rule_line("f f → g"), None);
        assert_eq!(parse_rule_line("f → F"), None);
        assert_eq!(parse_rule_line("f → f"), None);
        assert_eq!(parse_rule_line("f → g#x"), None);
        assert_eq!(parse_rule_line("f# → g"), None);
        assert_eq!(parse_rule_line("f → ff # note"), None);
    }
}
