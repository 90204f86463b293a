//! Parsed statements.

use std::fmt;

use tracing::debug;

use crate::ast::{StatementAst, StatementKind, WriteKind};
use crate::parser::{parse_descriptor, DescriptorParseError};
use crate::storage::{BackingStorage, Category, Statement, StatementDescriptor, WriteStatement};
use crate::validate::validate;

/// The immutable result of parsing and validating a descriptor.
///
/// Holds the AST, the number of free parameters and an unbound statement
/// template from the backing store. A `ParsedStatement` is never mutated
/// after construction and can be shared between any number of prepared
/// statements; each execution binds into a duplicate of the template.
#[derive(Debug)]
pub struct ParsedStatement {
    descriptor: StatementDescriptor,
    ast: StatementAst,
    template: Statement,
}

impl ParsedStatement {
    /// Parses and validates `descriptor`, acquiring a statement template
    /// from `storage`.
    ///
    /// # Errors
    ///
    /// Returns a `DescriptorParseError` if the descriptor is malformed or
    /// violates the rules of its statement kind.
    pub fn parse(
        storage: &dyn BackingStorage,
        descriptor: &StatementDescriptor,
    ) -> Result<Self, DescriptorParseError> {
        let category = descriptor.category();
        let ast = parse_descriptor(descriptor.descriptor(), category)?;
        validate(&ast, category)?;
        let template = create_template(storage, &ast, category);

        debug!(
            descriptor = %descriptor.descriptor(),
            kind = %ast.kind,
            parameters = ast.parameter_count,
            "Parsed statement descriptor"
        );

        Ok(Self {
            descriptor: descriptor.clone(),
            ast,
            template,
        })
    }

    /// Returns the descriptor this statement was parsed from.
    #[must_use]
    pub const fn descriptor(&self) -> &StatementDescriptor {
        &self.descriptor
    }

    /// Returns the AST.
    #[must_use]
    pub const fn ast(&self) -> &StatementAst {
        &self.ast
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.ast.kind
    }

    /// Returns the number of free parameters.
    #[must_use]
    pub const fn parameter_count(&self) -> usize {
        self.ast.parameter_count
    }

    /// Returns the unbound statement template.
    #[must_use]
    pub const fn template(&self) -> &Statement {
        &self.template
    }
}

impl fmt::Display for ParsedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ast.fmt(f)
    }
}

fn create_template(
    storage: &dyn BackingStorage,
    ast: &StatementAst,
    category: &Category,
) -> Statement {
    match ast.kind {
        StatementKind::Query(kind) => match kind.aggregate() {
            None => Statement::Query(storage.create_query(category)),
            Some(function) => {
                let key = ast
                    .aggregate_key
                    .as_deref()
                    .and_then(|name| category.key(name))
                    .cloned();
                Statement::Query(storage.create_aggregate_query(function, category, key))
            }
        },
        StatementKind::Write(WriteKind::Add) => {
            Statement::Write(WriteStatement::Add(storage.create_add(category)))
        }
        StatementKind::Write(WriteKind::Replace) => {
            Statement::Write(WriteStatement::Replace(storage.create_replace(category)))
        }
        StatementKind::Write(WriteKind::Update) => {
            Statement::Write(WriteStatement::Update(storage.create_update(category)))
        }
        StatementKind::Write(WriteKind::Remove) => {
            Statement::Write(WriteStatement::Remove(storage.create_remove(category)))
        }
    }
}
