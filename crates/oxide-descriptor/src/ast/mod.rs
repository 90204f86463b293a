//! Abstract syntax tree for statement descriptors.
//!
//! A [`StatementAst`] holds the statement kind, the category name, an
//! optional SET list and the WHERE/SORT/LIMIT suffix. WHERE expressions are
//! stored in an arena, see [`WhereExpression`].

mod node;
mod statement;
mod terminal;

pub use node::{BinaryOperator, Node, NodeId, Slot, WhereExpression};
pub use statement::{
    LimitExpression, QueryKind, SetList, SetListValue, SortExpression, SortMember, StatementAst,
    StatementKind, SuffixExpression, WriteKind,
};
pub use terminal::{is_bare_word, Literal, Terminal, TerminalValue};
