//! Semantic validation of parsed descriptors.
//!
//! Each statement kind has a fixed list of rules, checked in order. The
//! first violated rule rejects the descriptor.

use std::collections::BTreeSet;

use tracing::debug;

use crate::ast::{QueryKind, SetList, StatementAst, StatementKind, WriteKind};
use crate::parser::DescriptorParseError;
use crate::storage::Category;

/// A single semantic rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    WhereForbidden,
    WhereRequired,
    SetForbidden,
    SetRequired,
    /// No SET key may be a free parameter.
    SetKeysLiteral,
    SetKeysUnique,
    /// SET keys equal the category's full key set.
    SetKeysExact,
    /// SET keys are a subset of the category's keys.
    SetKeysKnown,
    SortForbidden,
    LimitForbidden,
    AggregateKeyRequired,
    AggregateKeyKnown,
}

const WRITE_SUFFIX: [Rule; 2] = [Rule::SortForbidden, Rule::LimitForbidden];

/// Returns the rules for a statement kind.
fn rules(kind: StatementKind) -> Vec<Rule> {
    match kind {
        StatementKind::Query(QueryKind::Query) => vec![Rule::SetForbidden],
        StatementKind::Query(QueryKind::Count) => {
            vec![Rule::SetForbidden, Rule::AggregateKeyKnown]
        }
        StatementKind::Query(QueryKind::Distinct) => vec![
            Rule::SetForbidden,
            Rule::AggregateKeyRequired,
            Rule::AggregateKeyKnown,
        ],
        StatementKind::Write(write) => {
            let mut rules = match write {
                WriteKind::Add => vec![
                    Rule::WhereForbidden,
                    Rule::SetRequired,
                    Rule::SetKeysLiteral,
                    Rule::SetKeysUnique,
                    Rule::SetKeysExact,
                ],
                WriteKind::Replace => vec![
                    Rule::WhereRequired,
                    Rule::SetRequired,
                    Rule::SetKeysLiteral,
                    Rule::SetKeysUnique,
                    Rule::SetKeysExact,
                ],
                WriteKind::Update => vec![
                    Rule::SetRequired,
                    Rule::SetKeysLiteral,
                    Rule::SetKeysUnique,
                    Rule::SetKeysKnown,
                    Rule::WhereRequired,
                ],
                WriteKind::Remove => vec![Rule::SetForbidden],
            };
            rules.extend(WRITE_SUFFIX);
            rules
        }
    }
}

impl Rule {
    /// Checks the rule, returning the violation message.
    fn check(self, ast: &StatementAst, category: &Category) -> Result<(), String> {
        let kind = ast.kind;
        let set_list = ast.set_list.as_ref();
        match self {
            Self::WhereForbidden if ast.suffix.where_expn.is_some() => {
                Err(format!("WHERE clause not allowed for {kind}"))
            }
            Self::WhereRequired if ast.suffix.where_expn.is_none() => {
                Err(format!("WHERE clause required for {kind}"))
            }
            Self::SetForbidden if set_list.is_some() => Err(format!("SET not allowed for {kind}")),
            Self::SetRequired if !set_list.is_some_and(|s| !s.values.is_empty()) => {
                Err(format!("SET list required for {kind}"))
            }
            Self::SetKeysLiteral
                if set_list.is_some_and(|s| s.values.iter().any(|p| p.key.as_parameter().is_some())) =>
            {
                Err(String::from("LHS of set list pair must not be a free variable."))
            }
            Self::SetKeysUnique => set_list.map_or(Ok(()), check_unique),
            Self::SetKeysExact => set_list.map_or(Ok(()), |s| check_exact(s, category)),
            Self::SetKeysKnown => set_list.map_or(Ok(()), |s| check_known(s, category)),
            Self::SortForbidden if ast.suffix.sort.is_some() => {
                Err(format!("SORT not allowed for {kind}"))
            }
            Self::LimitForbidden if ast.suffix.limit.is_some() => {
                Err(format!("LIMIT not allowed for {kind}"))
            }
            Self::AggregateKeyRequired if ast.aggregate_key.is_none() => {
                Err(format!("Aggregate key required for {kind}"))
            }
            Self::AggregateKeyKnown => match &ast.aggregate_key {
                Some(key) if !category.has_key(key) => Err(format!(
                    "Unknown aggregate key '{key}' for {kind} in category '{}'",
                    category.name()
                )),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

fn check_unique(set_list: &SetList) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    let duplicates: Vec<&str> = set_list
        .key_names()
        .filter(|name| !seen.insert(*name))
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(format!("Duplicate key(s) in SET: '{}'", duplicates.join(", ")))
    }
}

fn check_exact(set_list: &SetList, category: &Category) -> Result<(), String> {
    let expected = category.key_names();
    let actual: BTreeSet<&str> = set_list.key_names().collect();
    if expected == actual {
        Ok(())
    } else {
        Err(format!(
            "Keys don't match keys in category. Expected the following keys: [{}] got [{}]",
            join(&expected),
            join(&actual)
        ))
    }
}

fn check_known(set_list: &SetList, category: &Category) -> Result<(), String> {
    let unknown: Vec<&str> = set_list
        .key_names()
        .filter(|name| !category.has_key(name))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(format!("Unknown key(s) in SET: '{}'", unknown.join(", ")))
    }
}

fn join(names: &BTreeSet<&str>) -> String {
    names.iter().copied().collect::<Vec<_>>().join(", ")
}

/// Applies the semantic rules of the statement's kind.
///
/// # Errors
///
/// Returns a `DescriptorParseError` naming the first violated rule.
pub fn validate(ast: &StatementAst, category: &Category) -> Result<(), DescriptorParseError> {
    for rule in rules(ast.kind) {
        if let Err(message) = rule.check(ast, category) {
            debug!(kind = %ast.kind, ?rule, error = %message, "Descriptor rejected");
            return Err(DescriptorParseError::new(message));
        }
    }
    Ok(())
}
