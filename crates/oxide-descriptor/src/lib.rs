//! # oxide-descriptor
//!
//! Statement descriptors and prepared statements for category-based storage.
//!
//! A statement descriptor is a short line of text describing a read or write
//! against a category, for example
//! `QUERY vm-info WHERE vm-id = ?s SORT start-time DSC LIMIT ?i`.
//!
//! This crate provides:
//! - A hand-written recursive descent parser for descriptors
//! - Typed free parameters (`?s ?i ?l ?b ?d ?p`, with `[` for lists)
//! - Per-kind semantic validation (ADD, REPLACE, UPDATE, REMOVE and queries)
//! - Parameter binding into statements created by a [`BackingStorage`]
//! - [`PreparedStatement`]s and a shared [`StatementCache`] for parse-once,
//!   execute-many use
//!
//! ## Parsing
//!
//! ```rust
//! use oxide_descriptor::{parse_descriptor, Category, Key};
//!
//! let category = Category::new("vm-info", [Key::new("vm-id"), Key::new("start-time")]);
//! let ast = parse_descriptor(
//!     "QUERY vm-info WHERE vm-id=?s SORT start-time DSC LIMIT ?i",
//!     &category,
//! )
//! .unwrap();
//!
//! assert_eq!(ast.parameter_count, 2);
//! assert_eq!(
//!     ast.to_string(),
//!     "QUERY vm-info WHERE vm-id = ?s SORT start-time DSC LIMIT ?i"
//! );
//! ```
//!
//! ## Executing
//!
//! Execution goes through a [`BackingStorage`], which creates the statement
//! objects of the underlying store:
//!
//! ```rust,ignore
//! let descriptor = StatementDescriptor::new(category, "UPDATE vm-info SET owner = ?s WHERE vm-id = ?s");
//! let mut statement = cache.prepare(&storage, &descriptor)?;
//! statement.set_string(0, "alice")?;
//! statement.set_string(1, "vm123")?;
//! let updated = statement.execute()?;
//! ```

pub mod ast;
pub mod cache;
pub mod error;
pub mod lexer;
pub mod param;
pub mod parsed;
pub mod parser;
mod patch;
pub mod prepared;
pub mod storage;
pub mod validate;
pub mod value;

pub use ast::{StatementAst, StatementKind};
pub use cache::StatementCache;
pub use error::{BindingError, StatementExecutionError, StorageError};
pub use lexer::{Lexer, Token};
pub use param::{FreeParameter, ParameterKind, ParameterType};
pub use parsed::ParsedStatement;
pub use parser::{parse_descriptor, DescriptorParseError, DescriptorParser};
pub use prepared::{PreparedParameters, PreparedStatement};
pub use storage::{
    BackingStorage, Category, Cursor, Expression, Key, SortDirection, Statement,
    StatementDescriptor,
};
pub use value::{Pojo, ToValue, Value};
