//! Validator rule compilation
//!
//! A schema field declares validation rules by kind (`one_of`, `between`,
//! `match_none`, ...). [`ValidatorRule`] is the closed set of those kinds;
//! [`ValidatorRule::compile`] turns one rule descriptor into a [`Checker`],
//! a pure function closed over the descriptor's arguments. Dispatch from a
//! schema-declared kind name to its constructor goes through the serde tag
//! on the enum, never through reflection.
//!
//! Checkers report failure as a value, not an error: a failed check is the
//! expected path and must never panic, whatever shape of [`FieldValue`] it
//! is handed.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::pattern::PatternTable;
use crate::value::FieldValue;

/// Outcome of running one checker against one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Value satisfies the rule
    Pass,
    /// Value violates the rule; carries a human-readable message
    Fail(String),
    /// Value violates the rule with no message (`len_min` reports a bare
    /// boolean)
    Reject,
}

impl CheckResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass)
    }

    /// Failure message, if this outcome carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            CheckResult::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    fn fail(msg: impl Into<String>) -> Self {
        CheckResult::Fail(msg.into())
    }
}

/// A compiled validation check
///
/// Pure function of the rule it was compiled from; retains no external
/// mutable state.
pub struct Checker {
    check: Box<dyn Fn(&FieldValue) -> CheckResult + Send + Sync>,
}

impl Checker {
    fn new(check: impl Fn(&FieldValue) -> CheckResult + Send + Sync + 'static) -> Self {
        Self {
            check: Box::new(check),
        }
    }

    pub fn check(&self, value: &FieldValue) -> CheckResult {
        (self.check)(value)
    }
}

/// A `{pattern, err}` pair used by `match_none` and `match_all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub pattern: String,
    pub err: String,
}

/// A `{patterns, err}` descriptor used by `match_any`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAnyRule {
    pub patterns: Vec<String>,
    pub err: String,
}

/// A schema validation rule, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorRule {
    /// Numeric range, inclusive on both ends
    Between { min: f64, max: f64 },
    /// Membership in a fixed value list
    OneOf { values: Vec<String> },
    /// Required string prefix
    StartsWith { prefix: String },
    /// Sequence length strictly greater than `len`
    LenMin { len: usize },
    /// Value must not match the pattern
    MatchNone { pattern: String, err: String },
    /// Value must match the pattern
    Match { pattern: String },
    /// Every sub-rule is evaluated; all failures are reported together
    MatchAll { rules: Vec<MatchRule> },
    /// Every resolvable pattern must match. The schema source names this
    /// "any" but its semantics require all; we reproduce the behavior
    /// literally.
    MatchAny { patterns: Vec<String>, err: String },
    /// The selection must stay within a single group
    MutuallyExclusiveSubsets { groups: Vec<Vec<String>> },
}

/// Recognized rule kind names, in the order schema descriptors are scanned
pub const VALIDATOR_KINDS: [&str; 9] = [
    "between",
    "one_of",
    "starts_with",
    "len_min",
    "match_none",
    "match",
    "match_all",
    "match_any",
    "mutually_exclusive_subsets",
];

impl ValidatorRule {
    /// The kind name this rule dispatches under
    pub fn kind(&self) -> &'static str {
        match self {
            ValidatorRule::Between { .. } => "between",
            ValidatorRule::OneOf { .. } => "one_of",
            ValidatorRule::StartsWith { .. } => "starts_with",
            ValidatorRule::LenMin { .. } => "len_min",
            ValidatorRule::MatchNone { .. } => "match_none",
            ValidatorRule::Match { .. } => "match",
            ValidatorRule::MatchAll { .. } => "match_all",
            ValidatorRule::MatchAny { .. } => "match_any",
            ValidatorRule::MutuallyExclusiveSubsets { .. } => "mutually_exclusive_subsets",
        }
    }

    /// Compile this rule into an executable checker.
    ///
    /// Pattern keys are resolved here, once. An unresolvable key logs one
    /// warning and the affected pattern degrades to "no constraint"; the
    /// returned checker always works.
    pub fn compile(&self, patterns: &PatternTable) -> Checker {
        match self {
            ValidatorRule::Between { min, max } => compile_between(*min, *max),
            ValidatorRule::OneOf { values } => compile_one_of(values.clone()),
            ValidatorRule::StartsWith { prefix } => compile_starts_with(prefix.clone()),
            ValidatorRule::LenMin { len } => compile_len_min(*len),
            ValidatorRule::MatchNone { pattern, err } => {
                let regexp = resolve_pattern(patterns, pattern);
                let err = err.clone();
                Checker::new(move |value| match &regexp {
                    Some(re) if re.is_match(value_text(value)) => CheckResult::fail(err.as_str()),
                    _ => CheckResult::Pass,
                })
            }
            ValidatorRule::Match { pattern } => {
                let regexp = resolve_pattern(patterns, pattern);
                let message = format!("input should match pattern {}", pattern);
                Checker::new(move |value| match &regexp {
                    Some(re) if !re.is_match(value_text(value)) => {
                        CheckResult::fail(message.as_str())
                    }
                    _ => CheckResult::Pass,
                })
            }
            ValidatorRule::MatchAll { rules } => {
                let compiled: Vec<(Option<Regex>, String)> = rules
                    .iter()
                    .map(|rule| (resolve_pattern(patterns, &rule.pattern), rule.err.clone()))
                    .collect();
                Checker::new(move |value| {
                    let text = value_text(value);
                    let errs: Vec<&str> = compiled
                        .iter()
                        .filter(|(re, _)| matches!(re, Some(re) if !re.is_match(text)))
                        .map(|(_, err)| err.as_str())
                        .collect();
                    if errs.is_empty() {
                        CheckResult::Pass
                    } else {
                        CheckResult::fail(errs.join("; "))
                    }
                })
            }
            ValidatorRule::MatchAny { patterns: keys, err } => {
                let compiled: Vec<Option<Regex>> = keys
                    .iter()
                    .map(|pattern| resolve_pattern(patterns, pattern))
                    .collect();
                let err = err.clone();
                Checker::new(move |value| {
                    let text = value_text(value);
                    let valid = compiled
                        .iter()
                        .all(|re| re.as_ref().map(|re| re.is_match(text)).unwrap_or(true));
                    if valid {
                        CheckResult::Pass
                    } else {
                        CheckResult::fail(err.as_str())
                    }
                })
            }
            ValidatorRule::MutuallyExclusiveSubsets { groups } => {
                compile_mutually_exclusive(groups.clone())
            }
        }
    }
}

/// Resolve a Lua-pattern key against the table, warning once on a miss
fn resolve_pattern(patterns: &PatternTable, key: &str) -> Option<Regex> {
    match patterns.lookup(key) {
        Some(re) => Some(re.clone()),
        None => {
            warn!(pattern = %key, "check for pattern is not available");
            None
        }
    }
}

/// Text view of a value for pattern rules. Non-string values carry no text
/// to match against.
fn value_text(value: &FieldValue) -> &str {
    value.as_str().unwrap_or("")
}

fn compile_between(min: f64, max: f64) -> Checker {
    Checker::new(move |value| {
        let number = match value {
            FieldValue::Number(n) if !n.is_nan() => Some(*n),
            FieldValue::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n < min || n > max => {
                CheckResult::fail(format!("Value should between {} and {}", min, max))
            }
            Some(_) => CheckResult::Pass,
            None => CheckResult::fail("Please input integer value"),
        }
    })
}

fn compile_one_of(values: Vec<String>) -> Checker {
    // Membership set built once; the message keeps the original declaration
    // order, not set order.
    let members: HashSet<String> = values.iter().cloned().collect();
    let message = format!("Value should be one of: {}", values.join(","));
    Checker::new(move |value| match value.as_str() {
        Some(s) if members.contains(s) => CheckResult::Pass,
        _ => CheckResult::fail(message.as_str()),
    })
}

fn compile_starts_with(prefix: String) -> Checker {
    let message = format!("Value should start with: {}", prefix);
    Checker::new(move |value| {
        if value_text(value).starts_with(&prefix) {
            CheckResult::Pass
        } else {
            CheckResult::fail(message.as_str())
        }
    })
}

fn compile_len_min(len: usize) -> Checker {
    Checker::new(move |value| {
        if value.len() > len {
            CheckResult::Pass
        } else {
            CheckResult::Reject
        }
    })
}

fn compile_mutually_exclusive(groups: Vec<Vec<String>>) -> Checker {
    Checker::new(move |value| {
        let selected: Vec<&str> = match value {
            FieldValue::Set(items) => items.iter().map(String::as_str).collect(),
            FieldValue::List(items) => items.iter().filter_map(FieldValue::as_str).collect(),
            _ => Vec::new(),
        };
        if selected.is_empty() {
            return CheckResult::fail("Please choose one option");
        }
        // The first selected element (insertion order) picks the group.
        let group = match groups
            .iter()
            .find(|g| g.iter().any(|m| m.as_str() == selected[0]))
        {
            Some(group) => group,
            None => return CheckResult::fail("invalid option"),
        };
        if selected.len() == 1 {
            return CheckResult::Pass;
        }
        // Scan the group once; each member may discharge at most one of the
        // remaining selected elements.
        let mut remaining: Vec<&str> = selected[1..].to_vec();
        for member in group {
            if let Some(pos) = remaining.iter().position(|v| *v == member.as_str()) {
                remaining.remove(pos);
            }
        }
        if remaining.is_empty() {
            CheckResult::Pass
        } else {
            CheckResult::fail("conflict options")
        }
    })
}
