//! Arena storage for expression nodes

use serde_json::{Map, Value as JsonValue};

use super::{AstNode, NodeId};
use crate::error::{FormulaError, FormulaResult};
use crate::value::ValueObject;

/// Nodes of one or more expressions, addressed by [`NodeId`]
#[derive(Debug, Clone, Default)]
pub struct AstTree {
    nodes: Vec<AstNode>,
}

impl AstTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node; it has no parent until attached
    pub fn add_node(&mut self, node: AstNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> FormulaResult<&AstNode> {
        self.nodes.get(id.0).ok_or(FormulaError::InvalidNode(id.0))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> FormulaResult<&mut AstNode> {
        self.nodes.get_mut(id.0).ok_or(FormulaError::InvalidNode(id.0))
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// A previous parent keeps its link to the child; attach each node once.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> FormulaResult<()> {
        self.node(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Append children in argument order
    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) -> FormulaResult<()> {
        for &child in children {
            self.set_parent(child, parent)?;
        }
        Ok(())
    }

    pub fn children(&self, id: NodeId) -> FormulaResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    pub fn parent(&self, id: NodeId) -> FormulaResult<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    /// Cached value of a node
    pub fn value(&self, id: NodeId) -> FormulaResult<Option<&ValueObject>> {
        Ok(self.node(id)?.value.as_ref())
    }

    pub fn set_value(&mut self, id: NodeId, value: ValueObject) -> FormulaResult<()> {
        self.node_mut(id)?.value = Some(value);
        Ok(())
    }

    pub fn is_calculated(&self, id: NodeId) -> FormulaResult<bool> {
        Ok(self.node(id)?.calculated)
    }

    pub fn set_calculated(&mut self, id: NodeId) -> FormulaResult<()> {
        self.node_mut(id)?.calculated = true;
        Ok(())
    }

    /// Clear every cached value and calculated flag for a new pass
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.value = None;
            node.calculated = false;
        }
    }

    /// Nodes under `root` with every child before its parent, children in
    /// argument order
    pub fn post_order(&self, root: NodeId) -> FormulaResult<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.node(id)?.children.iter().rev() {
                stack.push((child, false));
            }
        }
        Ok(order)
    }

    /// `{token, nodeType, children}` view of a subtree
    ///
    /// `children` is left out for leaves. Values are not included.
    pub fn serialize(&self, id: NodeId) -> FormulaResult<JsonValue> {
        let node = self.node(id)?;
        let mut object = Map::new();
        object.insert("token".into(), JsonValue::String(node.token().to_string()));
        object.insert("nodeType".into(), JsonValue::String(node.node_type().as_str().to_string()));

        if !node.children.is_empty() {
            let children = node
                .children
                .iter()
                .map(|&child| self.serialize(child))
                .collect::<FormulaResult<Vec<_>>>()?;
            object.insert("children".into(), JsonValue::Array(children));
        }

        Ok(JsonValue::Object(object))
    }
}
