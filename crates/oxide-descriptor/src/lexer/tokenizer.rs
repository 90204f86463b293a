//! Descriptor tokenizer implementation.

use super::{Span, Token};

/// Characters separating tokens.
const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\u{000C}'];

/// Punctuation split out of unquoted chunks, longest spelling first.
const PUNCTUATION: [&str; 7] = ["!=", "<=", ">=", "=", "<", ">", ","];

/// A lexer that splits a descriptor into tokens.
///
/// Tokens are separated by runs of space, tab, CR, LF and form-feed. Within a
/// chunk, a quoted literal is kept whole up to its closing quote and the
/// comparison operators and `,` are split out of unquoted text, so `k1=?s`
/// yields the same tokens as `k1 = ?s`. A quoted literal containing
/// whitespace is still split into several chunks.
pub struct Lexer<'a> {
    /// The descriptor text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given descriptor.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole descriptor.
    #[must_use]
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some((start, chunk)) = self.next_chunk() {
            split_chunk(chunk, start, &mut tokens);
        }
        tokens
    }

    /// Returns the next whitespace delimited chunk and its start offset.
    fn next_chunk(&mut self) -> Option<(usize, &'a str)> {
        let rest = &self.input[self.pos..];
        let skipped = rest.len() - rest.trim_start_matches(DELIMITERS).len();
        self.pos += skipped;
        if self.pos >= self.input.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest.find(DELIMITERS).unwrap_or(rest.len());
        self.pos += len;
        Some((start, &rest[..len]))
    }
}

/// Splits one chunk into tokens, pushing them to `out`.
fn split_chunk(chunk: &str, offset: usize, out: &mut Vec<Token>) {
    let push = |out: &mut Vec<Token>, from: usize, to: usize| {
        out.push(Token::new(&chunk[from..to], Span::new(offset + from, offset + to)));
    };

    let mut word_start = 0;
    let mut i = 0;
    while i < chunk.len() {
        let rest = &chunk[i..];

        if i == word_start && rest.starts_with('\'') {
            // Unterminated literals run to the end of the chunk
            let end = rest[1..].find('\'').map_or(chunk.len(), |close| i + close + 2);
            push(out, i, end);
            i = end;
            word_start = end;
            continue;
        }

        if let Some(punct) = PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            if word_start < i {
                push(out, word_start, i);
            }
            push(out, i, i + punct.len());
            i += punct.len();
            word_start = i;
            continue;
        }

        i += rest.chars().next().map_or(1, char::len_utf8);
    }

    if word_start < chunk.len() {
        push(out, word_start, chunk.len());
    }
}
