//! Lexer tree to expression tree

use gridcalc_core::CellError;

use super::factory::{default_factories, AstNodeFactory, CreatedNode, FactoryParam, LexerItem};
use super::{AstNode, AstTree, NodeId};
use crate::error::FormulaResult;
use crate::functions::FunctionRegistry;

/// Builds expression trees with a set of node factories
pub struct AstBuilder<'r> {
    registry: &'r FunctionRegistry,
    factories: Vec<Box<dyn AstNodeFactory>>,
}

impl<'r> AstBuilder<'r> {
    /// Builder with the built-in factories
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self {
            registry,
            factories: default_factories(),
        }
    }

    /// Add a factory; it is asked in z-index order with the others
    pub fn with_factory<F: AstNodeFactory + 'static>(mut self, factory: F) -> Self {
        self.factories.push(Box::new(factory));
        self.factories.sort_by_key(|f| f.z_index());
        self
    }

    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    /// Build a new tree; returns it with its root node
    pub fn build(&self, item: &LexerItem) -> FormulaResult<(AstTree, NodeId)> {
        let mut tree = AstTree::new();
        let root = self.build_into(&mut tree, item)?;
        Ok((tree, root))
    }

    /// Add the nodes for `item` to an existing tree
    ///
    /// A lexer node with an empty token becomes a root node. A token no
    /// factory recognises becomes a `#NAME?` error node.
    pub fn build_into(&self, tree: &mut AstTree, item: &LexerItem) -> FormulaResult<NodeId> {
        let created = match item {
            LexerItem::Node(node) if node.token.trim().is_empty() => {
                CreatedNode::single(tree.add_node(AstNode::root()))
            }
            LexerItem::Node(node) => self.create(tree, FactoryParam::Node(node)),
            LexerItem::Token(token) => self.create(tree, FactoryParam::Token(token)),
        };

        for child in item.children() {
            let child = self.build_into(tree, child)?;
            tree.set_parent(child, created.operand_parent)?;
        }
        Ok(created.node)
    }

    fn create(&self, tree: &mut AstTree, param: FactoryParam<'_>) -> CreatedNode {
        for factory in &self.factories {
            if let Some(created) = factory.check_and_create_node_type(param, tree, self.registry) {
                return created;
            }
        }
        log::warn!("unrecognised token {:?}", param.token());
        CreatedNode::single(tree.add_node(AstNode::error(CellError::Name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeType;
    use crate::context::{EvalConfig, EvalContext, EvalRuntimeState};
    use crate::functions::CustomFunction;
    use crate::value::{CustomValue, Primitive, ValueObject};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn evaluate(registry: &FunctionRegistry, item: &LexerItem) -> ValueObject {
        let (mut tree, root) = AstBuilder::new(registry).build(item).unwrap();
        let config = EvalConfig::default();
        let runtime = EvalRuntimeState::default();
        tree.execute(root, &EvalContext::new(&config, &runtime)).unwrap()
    }

    #[test]
    fn test_build_sum() {
        let lexer = LexerItem::node(
            "SUM",
            vec![LexerItem::token("1"), LexerItem::token("2"), LexerItem::token("3")],
        );
        assert_eq!(evaluate(FunctionRegistry::builtins(), &lexer), ValueObject::Number(6.0));
    }

    #[test]
    fn test_build_root_and_prefix() {
        // =-@ABS(-2)*3
        let lexer = LexerItem::node(
            "",
            vec![LexerItem::node(
                "*",
                vec![
                    LexerItem::node("-@abs", vec![LexerItem::token("-2")]),
                    LexerItem::token("3"),
                ],
            )],
        );
        let (tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(&lexer).unwrap();
        assert_eq!(
            tree.serialize(root).unwrap(),
            json!({
                "token": "",
                "nodeType": "ROOT",
                "children": [{
                    "token": "MULTIPLY",
                    "nodeType": "FUNCTION",
                    "children": [
                        {
                            "token": "-",
                            "nodeType": "PREFIX",
                            "children": [{
                                "token": "@",
                                "nodeType": "PREFIX",
                                "children": [{
                                    "token": "ABS",
                                    "nodeType": "FUNCTION",
                                    "children": [{"token": "-2", "nodeType": "VALUE"}]
                                }]
                            }]
                        },
                        {"token": "3", "nodeType": "VALUE"}
                    ]
                }]
            })
        );
        assert_eq!(evaluate(FunctionRegistry::builtins(), &lexer), ValueObject::Number(-6.0));
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        let lexer = LexerItem::node("PLUS", vec![LexerItem::node("NOPE", vec![]), LexerItem::token("1")]);
        let (tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(&lexer).unwrap();
        let first = tree.children(root).unwrap()[0];
        assert_eq!(tree.node(first).unwrap().node_type(), NodeType::Error);
        assert_eq!(
            evaluate(FunctionRegistry::builtins(), &lexer),
            ValueObject::Error(CellError::Name)
        );
    }

    #[test]
    fn test_registered_custom_function() {
        let mut registry = FunctionRegistry::new();
        registry.register_executor(Arc::new(CustomFunction::new("ANSWER", |_| {
            CustomValue::Scalar(Primitive::Number(42.0))
        })));
        let lexer = LexerItem::node("answer", vec![]);
        assert_eq!(evaluate(&registry, &lexer), ValueObject::Number(42.0));
    }
}
