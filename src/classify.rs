//! Name-based operation classifier.
//!
//! An ordered rule table, evaluated top to bottom; the first matching rule
//! decides. Matching is case-sensitive, so the write verbs only match where
//! the vendor's camelCase naming puts them in lowercase (the leading verb).
//!
//! This is best-effort metadata, not a security boundary: operations whose
//! names match no rule classify as [`Classification::Other`], are allowed
//! through the read-only gate and are never cached. Some genuinely mutating
//! operations (e.g. `wipeNetworkSmDevices`) land there.

use crate::types::Classification;

/// How a rule matches an operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Prefix(&'static str),
    Contains(&'static str),
}

impl Pattern {
    fn matches(self, name: &str) -> bool {
        match self {
            Pattern::Prefix(p) => name.starts_with(p),
            Pattern::Contains(p) => name.contains(p),
        }
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Pattern,
    pub classification: Classification,
}

const fn read(prefix: &'static str) -> Rule {
    Rule {
        pattern: Pattern::Prefix(prefix),
        classification: Classification::Read,
    }
}

const fn write(verb: &'static str) -> Rule {
    Rule {
        pattern: Pattern::Contains(verb),
        classification: Classification::Write,
    }
}

/// The classification table. Read prefixes come first so that a `get…`
/// name mentioning a write verb stays a read.
pub const RULES: &[Rule] = &[
    read("get"),
    read("list"),
    read("search"),
    write("create"),
    write("update"),
    write("delete"),
    write("remove"),
    write("reboot"),
    write("cycle"),
    write("blink"),
    write("claim"),
    write("assign"),
    write("split"),
    write("combine"),
    write("unbind"),
    write("bind"),
    write("move"),
    write("renew"),
    write("clone"),
];

/// The first rule matching `name`, if any.
pub fn matching_rule(name: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.pattern.matches(name))
}

/// Classify an operation by name. Pure and total.
pub fn classify(name: &str) -> Classification {
    matching_rule(name)
        .map(|rule| rule.classification)
        .unwrap_or(Classification::Other)
}
