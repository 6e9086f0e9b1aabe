//! Node execution
//!
//! Both entry points walk a subtree post-order and run each node once its
//! children hold values. The async path differs only in awaiting pending
//! results returned by function executors.

use gridcalc_core::CellError;

use super::{AstTree, NodeId, NodeKind, PrefixOperator};
use crate::context::{EvalContext, FunctionContext};
use crate::error::FormulaResult;
use crate::functions::FunctionExecutor;
use crate::value::{ArrayValue, ValueObject};

/// Outcome of the synchronous part of a node's execution
enum Step {
    /// Nothing to store; the node is only marked calculated
    Skip,
    Done(ValueObject),
    /// A function result that still has to pass through [`AstTree::finish_function`]
    Function(ValueObject),
}

impl AstTree {
    /// Execute `root` and everything below it; returns the root's value
    ///
    /// Nodes already calculated are not run again. Pending async results are
    /// left unresolved.
    pub fn execute(&mut self, root: NodeId, ctx: &EvalContext<'_>) -> FormulaResult<ValueObject> {
        for id in self.post_order(root)? {
            if !self.is_calculated(id)? {
                self.execute_node(id, ctx)?;
            }
        }
        Ok(self.value(root)?.cloned().unwrap_or(ValueObject::Null))
    }

    /// Execute `root` and everything below it, awaiting async results
    ///
    /// Children still run one at a time in argument order.
    pub async fn execute_async(&mut self, root: NodeId, ctx: &EvalContext<'_>) -> FormulaResult<ValueObject> {
        for id in self.post_order(root)? {
            if !self.is_calculated(id)? {
                self.execute_node_async(id, ctx).await?;
            }
        }
        Ok(self.value(root)?.cloned().unwrap_or(ValueObject::Null))
    }

    /// Execute one node whose children are already calculated
    pub fn execute_node(&mut self, id: NodeId, ctx: &EvalContext<'_>) -> FormulaResult<()> {
        let value = match self.begin(id, ctx)? {
            Step::Skip => None,
            Step::Done(value) => Some(value),
            Step::Function(result) => Some(self.finish_function(result, ctx)),
        };
        self.store(id, value)
    }

    /// Execute one node whose children are already calculated, awaiting an
    /// async function result
    pub async fn execute_node_async(&mut self, id: NodeId, ctx: &EvalContext<'_>) -> FormulaResult<()> {
        let value = match self.begin(id, ctx)? {
            Step::Skip => None,
            Step::Done(value) => Some(value),
            Step::Function(mut result) => {
                while let ValueObject::AsyncScalar(pending) | ValueObject::AsyncArray(pending) = &result {
                    let pending = pending.clone();
                    result = pending.resolve().await;
                }
                Some(self.finish_function(result, ctx))
            }
        };
        self.store(id, value)
    }

    fn store(&mut self, id: NodeId, value: Option<ValueObject>) -> FormulaResult<()> {
        let node = self.node_mut(id)?;
        if value.is_some() {
            node.value = value;
        }
        node.calculated = true;
        Ok(())
    }

    fn begin(&mut self, id: NodeId, ctx: &EvalContext<'_>) -> FormulaResult<Step> {
        let kind = self.node(id)?.kind().clone();
        log::trace!("executing node {} ({:?})", id, kind);

        let step = match kind {
            NodeKind::Base => Step::Skip,
            NodeKind::Root => {
                let last = self.node(id)?.children.last().copied();
                match last {
                    Some(child) => Step::Done(self.value(child)?.cloned().unwrap_or(ValueObject::Null)),
                    None => Step::Done(ValueObject::Null),
                }
            }
            NodeKind::Value(value) => Step::Done(value),
            NodeKind::Error(error) => Step::Done(ValueObject::Error(error)),
            NodeKind::Reference(reference) => {
                let located = reference
                    .with_location(&ctx.runtime.unit_id, &ctx.runtime.sheet_id)
                    .with_data(ctx.reference_data());
                Step::Done(ValueObject::Reference(located))
            }
            NodeKind::Prefix { operator, executor } => {
                let operand = self.child_values(id)?.into_iter().next().unwrap_or(ValueObject::Null);
                Step::Done(apply_prefix(operator, executor.as_deref(), operand, &ctx.function_context()))
            }
            NodeKind::Function(executor) => {
                self.lookup_compatibility(id, executor.as_ref())?;
                let args = self.child_values(id)?;
                Step::Function(call_executor(executor.as_ref(), &args, &ctx.function_context()))
            }
        };
        Ok(step)
    }

    /// Reference results get the data they need to be read later
    fn finish_function(&self, result: ValueObject, ctx: &EvalContext<'_>) -> ValueObject {
        match result {
            ValueObject::Reference(mut reference) => {
                reference.set_data(ctx.reference_data());
                ValueObject::Reference(reference)
            }
            other => other,
        }
    }

    /// Child values as arguments: references are read into arrays and
    /// children without a value are left out
    fn child_values(&self, id: NodeId) -> FormulaResult<Vec<ValueObject>> {
        let mut values = Vec::new();
        for &child in &self.node(id)?.children {
            match self.value(child)? {
                Some(ValueObject::Reference(reference)) => values.push(reference.to_array_value()),
                Some(value) => values.push(value.clone()),
                None => {}
            }
        }
        Ok(values)
    }

    /// LOOKUP with a reference result vector of another length: stretch the
    /// result range along its long axis to the lookup vector's length
    fn lookup_compatibility(&mut self, id: NodeId, executor: &dyn FunctionExecutor) -> FormulaResult<()> {
        if executor.name() != "LOOKUP" {
            return Ok(());
        }
        let children = self.node(id)?.children.clone();
        if children.len() != 3 {
            return Ok(());
        }

        // (rows, columns) of the lookup vector
        let lookup_shape = match self.value(children[1])? {
            Some(ValueObject::Reference(r)) => (r.row_count(), r.column_count()),
            Some(ValueObject::Array(a)) => (a.row_count(), a.column_count()),
            _ => return Ok(()),
        };
        let Some(ValueObject::Reference(result)) = self.value(children[2])?.cloned() else {
            return Ok(());
        };
        if !result.is_vector() || !(lookup_shape.0 == 1 || lookup_shape.1 == 1) {
            return Ok(());
        }

        let lookup_len = lookup_shape.0.max(lookup_shape.1) as i64;
        let (rows, columns) = (result.row_count() as i64, result.column_count() as i64);
        let horizontal = if rows == columns {
            lookup_shape.0 == 1
        } else {
            rows == 1
        };
        let range = if horizontal {
            result.range().extend_end(0, lookup_len - columns)
        } else {
            result.range().extend_end(lookup_len - rows, 0)
        };
        if range == *result.range() {
            return Ok(());
        }

        log::debug!("LOOKUP result vector {} stretched to {}", result.token(), range);
        self.set_value(children[2], ValueObject::Reference(result.with_range(range)))
    }
}

fn call_executor(executor: &dyn FunctionExecutor, args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
    if !executor.is_custom() {
        return executor.calculate(args, ctx);
    }
    let plain = args.iter().map(ValueObject::to_custom_value).collect();
    ValueObject::from_custom_value(&executor.calculate_custom(plain))
}

fn apply_prefix(
    operator: PrefixOperator,
    executor: Option<&dyn FunctionExecutor>,
    operand: ValueObject,
    ctx: &FunctionContext,
) -> ValueObject {
    match operator {
        PrefixOperator::Minus => match executor {
            Some(minus) => minus.calculate(&[operand], ctx),
            None => operand.negate(),
        },
        PrefixOperator::At => implicit_intersection(&operand, ctx),
    }
}

/// The element of an array in the calling cell's row (column vectors) or
/// column (row vectors); a single element is returned as is
fn implicit_intersection(value: &ValueObject, ctx: &FunctionContext) -> ValueObject {
    let ValueObject::Array(array) = value else {
        return value.clone();
    };
    if let Some(single) = array.single() {
        return single.clone();
    }
    match (array.origin(), array.row_count(), array.column_count()) {
        (Some(origin), _, 1) => offset_element(array, ctx.row.checked_sub(origin.row).map(|r| (r as usize, 0))),
        (Some(origin), 1, _) => offset_element(
            array,
            ctx.column.checked_sub(origin.column).map(|c| (0, c as usize)),
        ),
        _ => ValueObject::Error(CellError::Value),
    }
}

fn offset_element(array: &ArrayValue, position: Option<(usize, usize)>) -> ValueObject {
    position
        .and_then(|(row, column)| array.get(row, column))
        .cloned()
        .unwrap_or(ValueObject::Error(CellError::Value))
}
