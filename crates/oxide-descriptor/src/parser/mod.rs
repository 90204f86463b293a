//! Descriptor parser
//!
//! A hand-written recursive descent parser building a [`StatementAst`]
//! from a tokenized descriptor.
//!
//! [`StatementAst`]: crate::ast::StatementAst

mod error;
mod parser;

pub use error::DescriptorParseError;
pub use parser::{parse_descriptor, DescriptorParser};
