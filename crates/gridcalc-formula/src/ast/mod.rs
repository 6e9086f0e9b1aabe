//! Expression tree
//!
//! Nodes live in an [`AstTree`] arena and refer to each other by [`NodeId`].
//! A tree is built from a lexer tree by [`AstBuilder`], which tries the node
//! factories in z-index order, and is evaluated post-order by
//! [`AstTree::execute`] or [`AstTree::execute_async`].

mod builder;
mod execute;
mod factory;
mod tree;

pub use builder::AstBuilder;
pub use factory::{
    AstNodeFactory, CreatedNode, ErrorNodeFactory, FactoryParam, FunctionNodeFactory, LexerItem, LexerNode,
    PrefixNodeFactory, ReferenceNodeFactory, ValueNodeFactory,
};
pub use tree::AstTree;

use std::fmt;
use std::sync::Arc;

use gridcalc_core::CellError;
use serde::Serialize;

use crate::functions::FunctionExecutor;
use crate::value::{ReferenceValue, ValueObject};

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node type tag, as reported by serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Base,
    Root,
    Function,
    Prefix,
    Reference,
    Value,
    Error,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Base => "BASE",
            NodeType::Root => "ROOT",
            NodeType::Function => "FUNCTION",
            NodeType::Prefix => "PREFIX",
            NodeType::Reference => "REFERENCE",
            NodeType::Value => "VALUE",
            NodeType::Error => "ERROR",
        }
    }
}

/// Unary prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// `-`: negation
    Minus,
    /// `@`: implicit intersection with the calling cell's row or column
    At,
}

impl PrefixOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "-" => Some(PrefixOperator::Minus),
            "@" => Some(PrefixOperator::At),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrefixOperator::Minus => "-",
            PrefixOperator::At => "@",
        }
    }
}

/// What a node does when executed
#[derive(Clone)]
pub enum NodeKind {
    /// Does nothing; its value stays unset
    Base,
    /// Passes its last child's value through
    Root,
    /// Calls an executor with its children's values
    Function(Arc<dyn FunctionExecutor>),
    /// Applies a prefix operator to its only child
    Prefix {
        operator: PrefixOperator,
        executor: Option<Arc<dyn FunctionExecutor>>,
    },
    /// Yields a reference located at the calling cell's sheet
    Reference(ReferenceValue),
    /// Yields a constant
    Value(ValueObject),
    /// Yields an error
    Error(CellError),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Base => write!(f, "Base"),
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Function(executor) => f.debug_tuple("Function").field(&executor.name()).finish(),
            NodeKind::Prefix { operator, .. } => f.debug_tuple("Prefix").field(operator).finish(),
            NodeKind::Reference(r) => f.debug_tuple("Reference").field(&r.token()).finish(),
            NodeKind::Value(v) => f.debug_tuple("Value").field(v).finish(),
            NodeKind::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

/// One evaluation step
#[derive(Debug, Clone)]
pub struct AstNode {
    token: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    kind: NodeKind,
    pub(crate) value: Option<ValueObject>,
    pub(crate) calculated: bool,
    is_async: bool,
    is_address: bool,
}

impl AstNode {
    fn with_kind(token: &str, kind: NodeKind) -> Self {
        Self {
            token: token.to_string(),
            children: Vec::new(),
            parent: None,
            kind,
            value: None,
            calculated: false,
            is_async: false,
            is_address: false,
        }
    }

    pub fn base(token: &str) -> Self {
        Self::with_kind(token, NodeKind::Base)
    }

    pub fn root() -> Self {
        Self::with_kind("", NodeKind::Root)
    }

    /// Function node; async and address flags come from the executor
    pub fn function(token: &str, executor: Arc<dyn FunctionExecutor>) -> Self {
        let is_async = executor.is_async();
        let is_address = executor.is_address();
        let mut node = Self::with_kind(token, NodeKind::Function(executor));
        node.is_async = is_async;
        node.is_address = is_address;
        node
    }

    pub fn prefix(operator: PrefixOperator, executor: Option<Arc<dyn FunctionExecutor>>) -> Self {
        Self::with_kind(operator.as_str(), NodeKind::Prefix { operator, executor })
    }

    pub fn reference(token: &str, reference: ReferenceValue) -> Self {
        Self::with_kind(token, NodeKind::Reference(reference))
    }

    pub fn value(token: &str, value: ValueObject) -> Self {
        Self::with_kind(token, NodeKind::Value(value))
    }

    pub fn error(error: CellError) -> Self {
        Self::with_kind(error.as_str(), NodeKind::Error(error))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Base => NodeType::Base,
            NodeKind::Root => NodeType::Root,
            NodeKind::Function(_) => NodeType::Function,
            NodeKind::Prefix { .. } => NodeType::Prefix,
            NodeKind::Reference(_) => NodeType::Reference,
            NodeKind::Value(_) => NodeType::Value,
            NodeKind::Error(_) => NodeType::Error,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Cached result; `None` until executed
    pub fn value_object(&self) -> Option<&ValueObject> {
        self.value.as_ref()
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_address(&self) -> bool {
        self.is_address
    }
}
