//! Node factories
//!
//! Each factory recognises one kind of token. The builder asks them in
//! z-index order, lowest first, and the first one that returns a node wins.

use gridcalc_core::CellError;
use serde::{Deserialize, Serialize};

use super::{AstNode, AstTree, NodeId, PrefixOperator};
use crate::functions::{meta::operator_function_name, FunctionRegistry};
use crate::value::{parse_scalar_token, ArrayValue, ReferenceValue, ValueObject};

/// A node of the lexer tree the builder consumes
///
/// Leaves are plain tokens; function calls and operators carry their
/// operands as children. An empty token groups a whole formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LexerItem {
    Token(String),
    Node(LexerNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexerNode {
    pub token: String,
    #[serde(default)]
    pub children: Vec<LexerItem>,
}

impl LexerItem {
    pub fn token<S: Into<String>>(token: S) -> Self {
        LexerItem::Token(token.into())
    }

    pub fn node<S: Into<String>>(token: S, children: Vec<LexerItem>) -> Self {
        LexerItem::Node(LexerNode {
            token: token.into(),
            children,
        })
    }

    pub fn token_str(&self) -> &str {
        match self {
            LexerItem::Token(token) => token,
            LexerItem::Node(node) => &node.token,
        }
    }

    pub fn children(&self) -> &[LexerItem] {
        match self {
            LexerItem::Token(_) => &[],
            LexerItem::Node(node) => &node.children,
        }
    }
}

/// What a factory is asked about
#[derive(Debug, Clone, Copy)]
pub enum FactoryParam<'a> {
    Token(&'a str),
    Node(&'a LexerNode),
}

impl<'a> FactoryParam<'a> {
    pub fn token(&self) -> &'a str {
        match self {
            FactoryParam::Token(token) => token,
            FactoryParam::Node(node) => &node.token,
        }
    }

    /// A token, or a lexer node without children
    fn leaf_token(&self) -> Option<&'a str> {
        match self {
            FactoryParam::Token(token) => Some(token),
            FactoryParam::Node(node) if node.children.is_empty() => Some(&node.token),
            FactoryParam::Node(_) => None,
        }
    }
}

/// Nodes created for one lexer item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedNode {
    /// Outermost node, attached to the enclosing node
    pub node: NodeId,
    /// Node that receives the lexer item's children
    pub operand_parent: NodeId,
}

impl CreatedNode {
    pub fn single(node: NodeId) -> Self {
        Self {
            node,
            operand_parent: node,
        }
    }
}

pub trait AstNodeFactory: Send + Sync {
    /// Priority; lower values are asked first
    fn z_index(&self) -> i32;

    /// Create nodes for `param`, or `None` to let the next factory try
    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        registry: &FunctionRegistry,
    ) -> Option<CreatedNode>;
}

/// Error literals such as `#N/A`
#[derive(Debug, Default)]
pub struct ErrorNodeFactory;

impl AstNodeFactory for ErrorNodeFactory {
    fn z_index(&self) -> i32 {
        0
    }

    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        _registry: &FunctionRegistry,
    ) -> Option<CreatedNode> {
        let error = CellError::from_str(param.leaf_token()?.trim())?;
        Some(CreatedNode::single(tree.add_node(AstNode::error(error))))
    }
}

/// Cell and range references such as `A1`, `Sheet2!$B$2:C9`
///
/// Only plain tokens; a childless lexer node named `LOG10` is a call.
#[derive(Debug, Default)]
pub struct ReferenceNodeFactory;

impl AstNodeFactory for ReferenceNodeFactory {
    fn z_index(&self) -> i32 {
        1
    }

    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        _registry: &FunctionRegistry,
    ) -> Option<CreatedNode> {
        let FactoryParam::Token(token) = param else {
            return None;
        };
        let token = token.trim();
        let reference = ReferenceValue::parse(token).ok()?;
        Some(CreatedNode::single(tree.add_node(AstNode::reference(token, reference))))
    }
}

/// Numbers, booleans, quoted strings and array literals
#[derive(Debug, Default)]
pub struct ValueNodeFactory;

impl AstNodeFactory for ValueNodeFactory {
    fn z_index(&self) -> i32 {
        2
    }

    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        _registry: &FunctionRegistry,
    ) -> Option<CreatedNode> {
        let FactoryParam::Token(token) = param else {
            return None;
        };
        let token = token.trim();
        let value = if token.starts_with('{') {
            match ArrayValue::parse_literal(token) {
                Ok(array) => ValueObject::Array(array),
                Err(e) => {
                    log::warn!("{}", e);
                    ValueObject::Error(CellError::Value)
                }
            }
        } else {
            parse_scalar_token(token)?
        };
        Some(CreatedNode::single(tree.add_node(AstNode::value(token, value))))
    }
}

/// Unary `-` and `@`: a lexer node with one operand, or a prefixed
/// reference token such as `-A1`
#[derive(Debug, Default)]
pub struct PrefixNodeFactory;

impl AstNodeFactory for PrefixNodeFactory {
    fn z_index(&self) -> i32 {
        3
    }

    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        registry: &FunctionRegistry,
    ) -> Option<CreatedNode> {
        match param {
            FactoryParam::Node(node) if node.children.len() == 1 => {
                let operator = PrefixOperator::from_token(&node.token)?;
                Some(CreatedNode::single(add_prefix(tree, registry, operator)))
            }
            FactoryParam::Node(_) => None,
            FactoryParam::Token(token) => {
                let token = token.trim();
                let operator = PrefixOperator::from_token(token.get(..1)?)?;
                let rest = &token[1..];
                let reference = ReferenceValue::parse(rest).ok()?;

                let prefix = add_prefix(tree, registry, operator);
                let operand = tree.add_node(AstNode::reference(rest.trim(), reference));
                tree.set_parent(operand, prefix).ok()?;
                Some(CreatedNode::single(prefix))
            }
        }
    }
}

fn add_prefix(tree: &mut AstTree, registry: &FunctionRegistry, operator: PrefixOperator) -> NodeId {
    let executor = match operator {
        PrefixOperator::Minus => registry.get_executor("MINUS"),
        PrefixOperator::At => None,
    };
    tree.add_node(AstNode::prefix(operator, executor))
}

/// Function calls and binary operators
///
/// Leading `-` and `@` on a function name become prefix nodes wrapped around
/// the function node: `-@F(x)` yields `- → @ → F`.
#[derive(Debug, Default)]
pub struct FunctionNodeFactory;

impl AstNodeFactory for FunctionNodeFactory {
    fn z_index(&self) -> i32 {
        6
    }

    fn check_and_create_node_type(
        &self,
        param: FactoryParam<'_>,
        tree: &mut AstTree,
        registry: &FunctionRegistry,
    ) -> Option<CreatedNode> {
        let FactoryParam::Node(node) = param else {
            return None;
        };
        let token = node.token.trim().to_uppercase();

        if let Some(name) = operator_function_name(&token) {
            let executor = registry.get_executor(name)?;
            return Some(CreatedNode::single(tree.add_node(AstNode::function(name, executor))));
        }

        let mut name = token.as_str();
        let minus = name.starts_with('-');
        if minus {
            name = &name[1..];
        }
        let at = name.starts_with('@');
        if at {
            name = &name[1..];
        }

        let executor = registry.get_executor(name)?;
        let function = tree.add_node(AstNode::function(name, executor));

        let mut outer = function;
        let mut wrap = |operator: PrefixOperator, tree: &mut AstTree| -> Option<()> {
            let prefix = add_prefix(tree, registry, operator);
            tree.set_parent(outer, prefix).ok()?;
            outer = prefix;
            Some(())
        };
        if at {
            wrap(PrefixOperator::At, tree)?;
        }
        if minus {
            wrap(PrefixOperator::Minus, tree)?;
        }

        Some(CreatedNode {
            node: outer,
            operand_parent: function,
        })
    }
}

/// The built-in factories, lowest z-index first
pub(crate) fn default_factories() -> Vec<Box<dyn AstNodeFactory>> {
    vec![
        Box::new(ErrorNodeFactory),
        Box::new(ReferenceNodeFactory),
        Box::new(ValueNodeFactory),
        Box::new(PrefixNodeFactory),
        Box::new(FunctionNodeFactory),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeType;
    use pretty_assertions::assert_eq;

    fn create(factory: &dyn AstNodeFactory, param: FactoryParam<'_>) -> Option<(AstTree, CreatedNode)> {
        let mut tree = AstTree::new();
        let created = factory.check_and_create_node_type(param, &mut tree, FunctionRegistry::builtins())?;
        Some((tree, created))
    }

    fn node_type(tree: &AstTree, id: NodeId) -> NodeType {
        tree.node(id).unwrap().node_type()
    }

    #[test]
    fn test_leaf_factories() {
        let (tree, created) = create(&ErrorNodeFactory, FactoryParam::Token("#n/a")).unwrap();
        assert_eq!(node_type(&tree, created.node), NodeType::Error);

        let (tree, created) = create(&ReferenceNodeFactory, FactoryParam::Token("Sheet2!A1:B3")).unwrap();
        assert_eq!(node_type(&tree, created.node), NodeType::Reference);
        assert!(create(&ReferenceNodeFactory, FactoryParam::Token("\"A1\"")).is_none());

        for token in ["1.5", "TRUE", "\"text\"", "{1,2;3,4}"] {
            let (tree, created) = create(&ValueNodeFactory, FactoryParam::Token(token)).unwrap();
            assert_eq!(node_type(&tree, created.node), NodeType::Value, "{}", token);
        }
        assert!(create(&ValueNodeFactory, FactoryParam::Token("UNKNOWN")).is_none());
    }

    #[test]
    fn test_prefix_factory() {
        let node = LexerNode {
            token: "-".into(),
            children: vec![LexerItem::token("A1")],
        };
        let (tree, created) = create(&PrefixNodeFactory, FactoryParam::Node(&node)).unwrap();
        assert_eq!(node_type(&tree, created.node), NodeType::Prefix);

        let (tree, created) = create(&PrefixNodeFactory, FactoryParam::Token("@B2:B9")).unwrap();
        assert_eq!(tree.node(created.node).unwrap().token(), "@");
        assert_eq!(tree.children(created.node).unwrap().len(), 1);

        let binary = LexerNode {
            token: "-".into(),
            children: vec![LexerItem::token("1"), LexerItem::token("2")],
        };
        assert!(create(&PrefixNodeFactory, FactoryParam::Node(&binary)).is_none());
    }

    #[test]
    fn test_function_factory() {
        let node = LexerNode {
            token: "-@sum".into(),
            children: vec![],
        };
        let (tree, created) = create(&FunctionNodeFactory, FactoryParam::Node(&node)).unwrap();
        assert_eq!(tree.node(created.node).unwrap().token(), "-");
        assert_eq!(tree.node(created.operand_parent).unwrap().token(), "SUM");
        assert_eq!(tree.parent(created.operand_parent).unwrap().map(|p| node_type(&tree, p)), Some(NodeType::Prefix));

        let operator = LexerNode {
            token: ">=".into(),
            children: vec![LexerItem::token("1"), LexerItem::token("2")],
        };
        let (tree, created) = create(&FunctionNodeFactory, FactoryParam::Node(&operator)).unwrap();
        assert_eq!(tree.node(created.node).unwrap().token(), "GREATER_THAN_OR_EQUAL");

        let unknown = LexerNode {
            token: "NOPE".into(),
            children: vec![],
        };
        assert!(create(&FunctionNodeFactory, FactoryParam::Node(&unknown)).is_none());
        assert!(create(&FunctionNodeFactory, FactoryParam::Token("SUM")).is_none());
    }

    #[test]
    fn test_lexer_item_from_json() {
        let item: LexerItem = serde_json::from_str(r#"{"token": "SUM", "children": ["A1:A3", "2"]}"#).unwrap();
        assert_eq!(
            item,
            LexerItem::node("SUM", vec![LexerItem::token("A1:A3"), LexerItem::token("2")])
        );
    }
}
