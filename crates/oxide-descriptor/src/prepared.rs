//! Prepared statements.
//!
//! A [`PreparedStatement`] pairs a shared [`ParsedStatement`] with its own
//! parameter values. Values are set positionally and bound on every
//! execution, so one descriptor is parsed once and executed any number of
//! times.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{BindingError, Result, StatementExecutionError};
use crate::parsed::ParsedStatement;
use crate::storage::{BackingStorage, Cursor, Statement, StatementDescriptor};
use crate::value::{Pojo, ToValue, Value};

/// Positional values for the free parameters of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedParameters {
    values: Vec<Option<Value>>,
}

impl PreparedParameters {
    /// Creates `count` unbound parameters.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            values: vec![None; count],
        }
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the statement has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Binds `value` at `index`.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` if there is no parameter at
    /// `index`.
    pub fn set(&mut self, index: usize, value: Value) -> std::result::Result<(), BindingError> {
        let count = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(BindingError::IndexOutOfRange { index, count })?;
        *slot = Some(value);
        Ok(())
    }

    /// Returns the value bound at `index`.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` if there is no parameter at
    /// `index` and `BindingError::UnboundParameter` if it has no value.
    pub fn get(&self, index: usize) -> std::result::Result<&Value, BindingError> {
        self.values
            .get(index)
            .ok_or(BindingError::IndexOutOfRange {
                index,
                count: self.values.len(),
            })?
            .as_ref()
            .ok_or(BindingError::UnboundParameter { index })
    }

    /// Unbinds all parameters.
    pub fn clear(&mut self) {
        self.values.fill(None);
    }
}

/// A parsed statement with its own set of parameter values.
///
/// Setters take `&mut self`, so a single instance is used by one caller at
/// a time. Share the underlying [`ParsedStatement`] instead, each user
/// holding its own `PreparedStatement`.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    parsed: Arc<ParsedStatement>,
    params: PreparedParameters,
}

impl PreparedStatement {
    /// Parses `descriptor` and prepares it for execution.
    ///
    /// # Errors
    ///
    /// Returns `StatementExecutionError::Descriptor` if the descriptor is
    /// invalid.
    pub fn prepare(storage: &dyn BackingStorage, descriptor: &StatementDescriptor) -> Result<Self> {
        let parsed = ParsedStatement::parse(storage, descriptor)?;
        Ok(Self::from_parsed(Arc::new(parsed)))
    }

    /// Prepares an already parsed statement.
    #[must_use]
    pub fn from_parsed(parsed: Arc<ParsedStatement>) -> Self {
        let params = PreparedParameters::new(parsed.parameter_count());
        Self { parsed, params }
    }

    /// Returns the parsed statement.
    #[must_use]
    pub const fn parsed(&self) -> &Arc<ParsedStatement> {
        &self.parsed
    }

    /// Returns the current parameter values.
    #[must_use]
    pub const fn parameters(&self) -> &PreparedParameters {
        &self.params
    }

    /// Returns the number of free parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Binds any convertible value at `index`.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` if there is no parameter at
    /// `index`.
    pub fn set<V: ToValue>(&mut self, index: usize, value: V) -> std::result::Result<(), BindingError> {
        self.params.set(index, value.to_value())
    }

    /// Binds a string.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_string(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::String(value.into()))
    }

    /// Binds a 32-bit integer.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_int(&mut self, index: usize, value: i32) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::Int(value))
    }

    /// Binds a 64-bit integer.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_long(&mut self, index: usize, value: i64) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::Long(value))
    }

    /// Binds a boolean.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_boolean(&mut self, index: usize, value: bool) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::Boolean(value))
    }

    /// Binds a double.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_double(&mut self, index: usize, value: f64) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::Double(value))
    }

    /// Binds a structured value as a Pojo.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index, or
    /// `BindingError::NotAPojo` if `value` does not serialize to an object.
    pub fn set_pojo<T: Serialize>(
        &mut self,
        index: usize,
        value: &T,
    ) -> std::result::Result<(), BindingError> {
        let pojo = Pojo::new(value)?;
        self.params.set(index, Value::Pojo(pojo))
    }

    /// Binds a list of strings.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_string_list<S: Into<String>>(
        &mut self,
        index: usize,
        values: impl IntoIterator<Item = S>,
    ) -> std::result::Result<(), BindingError> {
        let values = values.into_iter().map(Into::into).collect();
        self.params.set(index, Value::StringList(values))
    }

    /// Binds a list of 32-bit integers.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_int_list(&mut self, index: usize, values: Vec<i32>) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::IntList(values))
    }

    /// Binds a list of 64-bit integers.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_long_list(&mut self, index: usize, values: Vec<i64>) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::LongList(values))
    }

    /// Binds a list of booleans.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_boolean_list(
        &mut self,
        index: usize,
        values: Vec<bool>,
    ) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::BooleanList(values))
    }

    /// Binds a list of doubles.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index.
    pub fn set_double_list(&mut self, index: usize, values: Vec<f64>) -> std::result::Result<(), BindingError> {
        self.params.set(index, Value::DoubleList(values))
    }

    /// Binds a list of structured values as Pojos.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::IndexOutOfRange` for an invalid index, or
    /// `BindingError::NotAPojo` if an element does not serialize to an
    /// object.
    pub fn set_pojo_list<T: Serialize>(
        &mut self,
        index: usize,
        values: &[T],
    ) -> std::result::Result<(), BindingError> {
        let pojos = values
            .iter()
            .map(Pojo::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.params.set(index, Value::PojoList(pojos))
    }

    /// Unbinds all parameters.
    pub fn clear_parameters(&mut self) {
        self.params.clear();
    }

    /// Binds the current parameters into a new statement.
    ///
    /// # Errors
    ///
    /// Returns a `BindingError` if the parameters do not fit the statement.
    pub fn bind(&self) -> std::result::Result<Statement, BindingError> {
        self.parsed.patch(&self.params)
    }

    /// Executes a write statement, returning the number of affected records.
    ///
    /// # Errors
    ///
    /// Returns `StatementExecutionError::IllegalOperation` for queries, a
    /// binding error if the parameters do not fit, or the backing store's
    /// failure.
    pub fn execute(&self) -> Result<u64> {
        let kind = self.parsed.kind();
        if kind.is_query() {
            return Err(StatementExecutionError::IllegalOperation {
                operation: "execute",
                kind,
            });
        }
        match self.bind()? {
            Statement::Write(statement) => {
                debug!(statement = %self.parsed, "Executing write statement");
                Ok(statement.execute()?)
            }
            Statement::Query(_) => Err(StatementExecutionError::IllegalOperation {
                operation: "execute",
                kind,
            }),
        }
    }

    /// Executes a query, returning a lazy cursor over its results.
    ///
    /// # Errors
    ///
    /// Returns `StatementExecutionError::IllegalOperation` for write
    /// statements, a binding error if the parameters do not fit, or the
    /// backing store's failure.
    pub fn execute_query(&self) -> Result<Cursor> {
        let kind = self.parsed.kind();
        if !kind.is_query() {
            return Err(StatementExecutionError::IllegalOperation {
                operation: "execute_query",
                kind,
            });
        }
        match self.bind()? {
            Statement::Query(query) => {
                debug!(statement = %self.parsed, "Executing query");
                Ok(query.execute_query()?)
            }
            Statement::Write(_) => Err(StatementExecutionError::IllegalOperation {
                operation: "execute_query",
                kind,
            }),
        }
    }
}
