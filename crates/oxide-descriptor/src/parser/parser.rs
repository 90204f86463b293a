//! Descriptor parser implementation.

use std::sync::LazyLock;

use regex::Regex;

use super::error::DescriptorParseError;
use crate::ast::{
    is_bare_word, BinaryOperator, LimitExpression, Literal, Node, QueryKind, SetList,
    SetListValue, Slot, SortExpression, SortMember, StatementAst, StatementKind,
    SuffixExpression, Terminal, TerminalValue, WhereExpression, WriteKind,
};
use crate::lexer::{Keyword, Lexer, Token};
use crate::param::{FreeParameter, ParameterType, TermContext};
use crate::storage::{Category, ComparisonOperator, LogicalOperator, SortDirection};

/// Aggregate statement types with an optional parenthesized key.
static AGGREGATE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(QUERY-COUNT|QUERY-DISTINCT)(?:\(([^()]+)\))?$")
        .expect("aggregate statement pattern is valid")
});

/// Position in the token stream and the next free parameter index.
#[derive(Debug, Default)]
struct ParserState {
    pos: usize,
    next_index: usize,
}

/// Statement descriptor parser.
///
/// The parser only holds the tokens and the category; the cursor and the
/// placeholder counter live in a state value passed through every rule, so
/// one parser can be run any number of times.
pub struct DescriptorParser<'a> {
    descriptor: &'a str,
    tokens: Vec<Token>,
    category: &'a Category,
}

impl<'a> DescriptorParser<'a> {
    /// Creates a parser for `descriptor` against `category`.
    #[must_use]
    pub fn new(descriptor: &'a str, category: &'a Category) -> Self {
        Self {
            descriptor,
            tokens: Lexer::new(descriptor).tokenize(),
            category,
        }
    }

    /// Parses the whole descriptor.
    ///
    /// # Errors
    ///
    /// Returns a `DescriptorParseError` if the descriptor does not match the
    /// grammar, names another category or has tokens left over.
    pub fn parse(&self) -> Result<StatementAst, DescriptorParseError> {
        let mut state = ParserState::default();
        let (kind, aggregate_key) = self.parse_statement_type(&mut state)?;
        let category = self.parse_category(&mut state)?;

        let set_list = if self.eat_keyword(&mut state, Keyword::Set) {
            Some(self.parse_set_list(&mut state)?)
        } else {
            None
        };
        let suffix = self.parse_suffix(&mut state)?;

        if let Some(token) = self.peek(&state) {
            return Err(DescriptorParseError::at(
                format!("Unexpected token '{}' after end of statement", token.text),
                token.span,
            ));
        }

        Ok(StatementAst {
            kind,
            aggregate_key,
            category,
            set_list,
            suffix,
            parameter_count: state.next_index,
        })
    }

    /// Parses the statement type, including an aggregate key.
    fn parse_statement_type(
        &self,
        state: &mut ParserState,
    ) -> Result<(StatementKind, Option<String>), DescriptorParseError> {
        let token = self.next(state, "statement type")?;
        let kind = match token.keyword() {
            Some(Keyword::Query) => StatementKind::Query(QueryKind::Query),
            Some(Keyword::Add) => StatementKind::Write(WriteKind::Add),
            Some(Keyword::Replace) => StatementKind::Write(WriteKind::Replace),
            Some(Keyword::Update) => StatementKind::Write(WriteKind::Update),
            Some(Keyword::Remove) => StatementKind::Write(WriteKind::Remove),
            _ => {
                let Some(caps) = AGGREGATE_TYPE.captures(&token.text) else {
                    return Err(DescriptorParseError::at(
                        format!("Unknown statement type '{}'", token.text),
                        token.span,
                    ));
                };
                let kind = if &caps[1] == "QUERY-COUNT" {
                    QueryKind::Count
                } else {
                    QueryKind::Distinct
                };
                let key = caps.get(2).map(|m| unquote(m.as_str()).to_string());
                return Ok((StatementKind::Query(kind), key));
            }
        };
        Ok((kind, None))
    }

    /// Parses the category name and checks it against the category.
    fn parse_category(&self, state: &mut ParserState) -> Result<String, DescriptorParseError> {
        let token = self.next(state, "category name")?;
        let name = unquote(&token.text);
        if name != self.category.name() {
            return Err(DescriptorParseError::at(
                format!(
                    "Category '{name}' does not match category '{}'",
                    self.category.name()
                ),
                token.span,
            ));
        }
        Ok(name.to_string())
    }

    /// Parses `pair (',' pair)*` after SET.
    fn parse_set_list(&self, state: &mut ParserState) -> Result<SetList, DescriptorParseError> {
        let mut values = Vec::new();
        loop {
            let key = self.parse_key(state, TermContext::SetList)?;
            self.expect(state, "=")?;
            let value = self.parse_term(state, TermContext::SetList, false)?;
            values.push(SetListValue { key, value });

            if !self.eat(state, ",") {
                break;
            }
        }
        Ok(SetList { values })
    }

    /// Parses the optional WHERE, SORT and LIMIT clauses.
    fn parse_suffix(&self, state: &mut ParserState) -> Result<SuffixExpression, DescriptorParseError> {
        let mut suffix = SuffixExpression::default();

        if self.eat_keyword(state, Keyword::Where) {
            suffix.where_expn = Some(self.parse_where(state)?);
        }
        if self.eat_keyword(state, Keyword::Sort) {
            suffix.sort = Some(self.parse_sort_list(state)?);
        }
        if self.eat_keyword(state, Keyword::Limit) {
            let value = self.parse_term(state, TermContext::Limit, false)?;
            if let Some(literal) = non_int_literal(&value) {
                return Err(DescriptorParseError::new(format!(
                    "LIMIT requires an integer, found {literal}"
                )));
            }
            suffix.limit = Some(LimitExpression { value });
        }

        Ok(suffix)
    }

    /// Parses a WHERE expression.
    ///
    /// Each OR takes the whole expression built so far as its left child.
    fn parse_where(&self, state: &mut ParserState) -> Result<WhereExpression, DescriptorParseError> {
        let mut expr = WhereExpression::new();
        self.parse_and_chain(state, &mut expr, Slot::Root)?;

        while self.eat_keyword(state, Keyword::Or) {
            let or = expr.push(Node::Binary {
                op: BinaryOperator::Logical(LogicalOperator::Or),
                left: None,
                right: None,
            });
            expr.reroot(Slot::Root, or);
            debug_assert_eq!(expr.root(), Some(or));
            self.parse_and_chain(state, &mut expr, Slot::Right(or))?;
        }

        Ok(expr)
    }

    /// Parses `condition (AND condition)*` into `slot`.
    ///
    /// Each AND takes the chain built so far at `slot` as its left child, so
    /// AND chains nest left-deep below any OR.
    fn parse_and_chain(
        &self,
        state: &mut ParserState,
        expr: &mut WhereExpression,
        slot: Slot,
    ) -> Result<(), DescriptorParseError> {
        self.parse_condition(state, expr, slot)?;

        while self.eat_keyword(state, Keyword::And) {
            let and = expr.push(Node::Binary {
                op: BinaryOperator::Logical(LogicalOperator::And),
                left: None,
                right: None,
            });
            expr.reroot(slot, and);
            self.parse_condition(state, expr, Slot::Right(and))?;
        }

        Ok(())
    }

    /// Parses `NOT condition | comparison` into `slot`.
    fn parse_condition(
        &self,
        state: &mut ParserState,
        expr: &mut WhereExpression,
        slot: Slot,
    ) -> Result<(), DescriptorParseError> {
        if self.eat_keyword(state, Keyword::Not) {
            let not = expr.push(Node::Not { child: None });
            expr.attach(slot, not);
            return self.parse_condition(state, expr, Slot::Child(not));
        }

        let lhs = self.parse_key(state, TermContext::Where)?;
        let op = self.parse_comparison_operator(state)?;
        let rhs = self.parse_term(state, TermContext::Where, false)?;

        let comparison = expr.push(Node::Binary {
            op: BinaryOperator::Comparison(op),
            left: None,
            right: None,
        });
        let lhs = expr.push(Node::Terminal(lhs));
        let rhs = expr.push(Node::Terminal(rhs));
        expr.attach(slot, comparison);
        expr.attach(Slot::Left(comparison), lhs);
        expr.attach(Slot::Right(comparison), rhs);
        Ok(())
    }

    fn parse_comparison_operator(
        &self,
        state: &mut ParserState,
    ) -> Result<ComparisonOperator, DescriptorParseError> {
        let token = self.next(state, "comparison operator")?;
        ComparisonOperator::from_token(&token.text).ok_or_else(|| {
            DescriptorParseError::unexpected("comparison operator", &token.text, token.span)
        })
    }

    /// Parses `term ('ASC'|'DSC') (',' term ('ASC'|'DSC'))*`.
    fn parse_sort_list(&self, state: &mut ParserState) -> Result<SortExpression, DescriptorParseError> {
        let mut members = Vec::new();
        loop {
            let key = self.parse_key(state, TermContext::Sort)?;
            let token = self.next(state, "ASC or DSC")?;
            let direction = match token.keyword() {
                Some(Keyword::Asc) => SortDirection::Ascending,
                Some(Keyword::Dsc) => SortDirection::Descending,
                _ => {
                    return Err(DescriptorParseError::unexpected(
                        "ASC or DSC",
                        &token.text,
                        token.span,
                    ))
                }
            };
            members.push(SortMember { key, direction });

            if !self.eat(state, ",") {
                break;
            }
        }
        Ok(SortExpression { members })
    }

    /// Parses a term naming a key: a free parameter, a quoted string or a
    /// bare key name.
    fn parse_key(
        &self,
        state: &mut ParserState,
        context: TermContext,
    ) -> Result<Terminal, DescriptorParseError> {
        let span = self.peek(state).map(|t| t.span);
        let key = self.parse_term(state, context, true)?;
        if let Some(literal) = non_string_literal(&key) {
            let message = format!("Expected a key in {}, found {literal}", context.clause());
            return Err(match span {
                Some(span) => DescriptorParseError::at(message, span),
                None => DescriptorParseError::new(message),
            });
        }
        Ok(key)
    }

    /// Parses a single term.
    fn parse_term(
        &self,
        state: &mut ParserState,
        context: TermContext,
        is_lhs: bool,
    ) -> Result<Terminal, DescriptorParseError> {
        let token = self.next(state, "term")?;
        let text = token.text.as_str();

        if token.keyword().is_some() || ComparisonOperator::from_token(text).is_some() || text == ","
        {
            return Err(DescriptorParseError::unexpected("term", text, token.span));
        }

        if text.starts_with('?') {
            let ty = ParameterType::parse(text).ok_or_else(|| {
                DescriptorParseError::at(format!("Invalid free parameter '{text}'"), token.span)
            })?;
            if !context.permits(ty) {
                return Err(DescriptorParseError::at(
                    format!(
                        "Free parameter of type {ty} not allowed in {}",
                        context.clause()
                    ),
                    token.span,
                ));
            }
            let param = FreeParameter {
                index: state.next_index,
                ty,
            };
            state.next_index += 1;
            return Ok(Terminal::parameter(param, is_lhs));
        }

        if text.starts_with('\'') {
            if text.len() < 2 || !text.ends_with('\'') {
                return Err(DescriptorParseError::at(
                    format!("Improperly quoted string literal {text}"),
                    token.span,
                ));
            }
            let inner = &text[1..text.len() - 1];
            return Ok(Terminal::literal(Literal::String(inner.to_string()), is_lhs));
        }

        let literal = match text {
            "true" => Some(Literal::Boolean(true)),
            "false" => Some(Literal::Boolean(false)),
            _ if looks_numeric(text) => Some(parse_number(text).ok_or_else(|| {
                DescriptorParseError::at(format!("Malformed number literal '{text}'"), token.span)
            })?),
            _ => None,
        };
        if let Some(literal) = literal {
            return Ok(Terminal::literal(literal, is_lhs));
        }

        if is_lhs && is_bare_word(text) {
            return Ok(Terminal::literal(Literal::String(text.to_string()), true));
        }

        Err(DescriptorParseError::at(
            format!("Unquoted string literal {text}"),
            token.span,
        ))
    }

    // --- Helper methods ---

    /// Returns the current token without consuming it.
    fn peek(&self, state: &ParserState) -> Option<&Token> {
        self.tokens.get(state.pos)
    }

    /// Consumes the current token, failing at the end of the descriptor.
    fn next(&self, state: &mut ParserState, expected: &str) -> Result<&Token, DescriptorParseError> {
        let token = self.tokens.get(state.pos).ok_or_else(|| {
            DescriptorParseError::unexpected_eof(expected, self.descriptor.len())
        })?;
        state.pos += 1;
        Ok(token)
    }

    /// Consumes the current token if it is the given keyword.
    fn eat_keyword(&self, state: &mut ParserState, keyword: Keyword) -> bool {
        let matched = self.peek(state).is_some_and(|t| t.is_keyword(keyword));
        if matched {
            state.pos += 1;
        }
        matched
    }

    /// Consumes the current token if its text is `text`.
    fn eat(&self, state: &mut ParserState, text: &str) -> bool {
        let matched = self.peek(state).is_some_and(|t| t.is(text));
        if matched {
            state.pos += 1;
        }
        matched
    }

    /// Expects the current token to be `text`.
    fn expect(&self, state: &mut ParserState, text: &str) -> Result<(), DescriptorParseError> {
        let token = self.next(state, &format!("'{text}'"))?;
        if token.is(text) {
            Ok(())
        } else {
            Err(DescriptorParseError::unexpected(
                format!("'{text}'"),
                &token.text,
                token.span,
            ))
        }
    }
}

/// Parses `descriptor` against `category`.
///
/// # Errors
///
/// Returns a `DescriptorParseError` if the descriptor is not well formed.
pub fn parse_descriptor(
    descriptor: &str,
    category: &Category,
) -> Result<StatementAst, DescriptorParseError> {
    DescriptorParser::new(descriptor, category).parse()
}

/// Strips one pair of enclosing single quotes.
fn unquote(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

/// Parses an int literal, or a long literal with an `L` or `l` suffix.
fn parse_number(text: &str) -> Option<Literal> {
    match text.strip_suffix(['L', 'l']) {
        Some(digits) => digits.parse().ok().map(Literal::Long),
        None => text.parse().ok().map(Literal::Int),
    }
}

fn non_string_literal(term: &Terminal) -> Option<String> {
    match &term.value {
        TerminalValue::Literal(literal) if !matches!(literal, Literal::String(_)) => {
            Some(literal.to_string())
        }
        _ => None,
    }
}

fn non_int_literal(term: &Terminal) -> Option<String> {
    match &term.value {
        TerminalValue::Literal(literal) if !matches!(literal, Literal::Int(_)) => {
            Some(literal.to_string())
        }
        _ => None,
    }
}
