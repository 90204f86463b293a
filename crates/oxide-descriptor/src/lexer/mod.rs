//! Descriptor Tokenizer
//!
//! Splits statement descriptors into whitespace delimited tokens.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token};
pub use tokenizer::Lexer;
