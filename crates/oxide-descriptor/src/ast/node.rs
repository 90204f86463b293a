//! Arena-backed WHERE expression trees.
//!
//! Nodes live in a flat vector and refer to each other by [`NodeId`]. Every
//! node records its parent, so the parser can re-root an already built
//! subtree under a new AND/OR node by reassigning indices.
//!
//! Child slots are optional: a slot is empty between creating a node and
//! parsing the subtree that fills it. A successfully parsed tree has no empty
//! slots.

use std::fmt;

use super::Terminal;
use crate::storage::{ComparisonOperator, LogicalOperator};

/// Handle of a node within a [`WhereExpression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Operator of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Comparison(ComparisonOperator),
    Logical(LogicalOperator),
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison(op) => op.fmt(f),
            Self::Logical(op) => op.fmt(f),
        }
    }
}

/// A node of a WHERE expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Comparison or logical combination of two children.
    Binary {
        op: BinaryOperator,
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
    /// Negation of a single child.
    Not { child: Option<NodeId> },
    /// A literal or free parameter.
    Terminal(Terminal),
}

/// A pending position in the tree that a node can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The root of the whole expression.
    Root,
    /// Left child of a binary node.
    Left(NodeId),
    /// Right child of a binary node.
    Right(NodeId),
    /// Child of a NOT node.
    Child(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
}

/// A WHERE expression tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereExpression {
    nodes: Vec<Entry>,
    root: Option<NodeId>,
}

impl WhereExpression {
    /// Creates an empty expression.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the node for a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this expression.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0].node
    }

    /// Returns the parent of a node, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the expression has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the terminals in the order they were parsed.
    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.nodes.iter().filter_map(|entry| match &entry.node {
            Node::Terminal(terminal) => Some(terminal),
            _ => None,
        })
    }

    /// Adds a detached node.
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Entry { node, parent: None });
        id
    }

    /// Returns the node currently occupying `slot`.
    pub(crate) fn occupant(&self, slot: Slot) -> Option<NodeId> {
        match slot {
            Slot::Root => self.root,
            Slot::Left(id) => match self.node(id) {
                Node::Binary { left, .. } => *left,
                _ => None,
            },
            Slot::Right(id) => match self.node(id) {
                Node::Binary { right, .. } => *right,
                _ => None,
            },
            Slot::Child(id) => match self.node(id) {
                Node::Not { child } => *child,
                _ => None,
            },
        }
    }

    /// Attaches `id` at `slot`, replacing any occupant.
    pub(crate) fn attach(&mut self, slot: Slot, id: NodeId) {
        let parent = match slot {
            Slot::Root => {
                self.root = Some(id);
                None
            }
            Slot::Left(p) | Slot::Right(p) | Slot::Child(p) => {
                match (&mut self.nodes[p.0].node, slot) {
                    (Node::Binary { left, .. }, Slot::Left(_)) => *left = Some(id),
                    (Node::Binary { right, .. }, Slot::Right(_)) => *right = Some(id),
                    (Node::Not { child }, Slot::Child(_)) => *child = Some(id),
                    (node, slot) => {
                        debug_assert!(false, "cannot attach to {slot:?} of {node:?}");
                    }
                }
                Some(p)
            }
        };
        self.nodes[id.0].parent = parent;
    }

    /// Moves the subtree at `slot` under the binary node `id` as its left
    /// child and puts `id` in its place.
    pub(crate) fn reroot(&mut self, slot: Slot, id: NodeId) {
        if let Some(previous) = self.occupant(slot) {
            self.attach(Slot::Left(id), previous);
        }
        self.attach(slot, id);
    }

    fn fmt_node(&self, id: Option<NodeId>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(id) = id else {
            return f.write_str("<incomplete>");
        };
        match self.node(id) {
            Node::Binary { op, left, right } => {
                self.fmt_node(*left, f)?;
                write!(f, " {op} ")?;
                self.fmt_node(*right, f)
            }
            Node::Not { child } => {
                f.write_str("NOT ")?;
                self.fmt_node(*child, f)
            }
            Node::Terminal(terminal) => write!(f, "{terminal}"),
        }
    }
}

impl fmt::Display for WhereExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}
