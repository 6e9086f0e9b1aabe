//! Caller-registered executors
//!
//! [`CustomFunction`] works on plain [`CustomValue`]s and [`AsyncFunction`]
//! returns pending value objects. Both are registered with
//! [`FunctionRegistry::register_executor`](super::FunctionRegistry::register_executor).

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

use super::FunctionExecutor;
use crate::context::FunctionContext;
use crate::value::{AsyncValue, CustomValue, ValueObject};

type CustomImpl = Box<dyn Fn(Vec<CustomValue>) -> CustomValue + Send + Sync>;
type AsyncImpl = Box<dyn Fn(Vec<ValueObject>, FunctionContext) -> BoxFuture<'static, ValueObject> + Send + Sync>;

/// A function over plain values
///
/// Arguments arrive as scalars or nested rows; an array-shaped return value
/// becomes an array value object.
pub struct CustomFunction {
    name: String,
    func: CustomImpl,
}

impl CustomFunction {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<CustomValue>) -> CustomValue + Send + Sync + 'static,
    {
        Self {
            name: name.to_uppercase(),
            func: Box::new(func),
        }
    }
}

impl FunctionExecutor for CustomFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_custom(&self) -> bool {
        true
    }

    fn calculate(&self, args: &[ValueObject], _ctx: &FunctionContext) -> ValueObject {
        let args = args.iter().map(ValueObject::to_custom_value).collect();
        ValueObject::from_custom_value(&self.calculate_custom(args))
    }

    fn calculate_custom(&self, args: Vec<CustomValue>) -> CustomValue {
        log::debug!("calling custom function {} with {} argument(s)", self.name, args.len());
        (self.func)(args)
    }
}

impl fmt::Debug for CustomFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFunction").field("name", &self.name).finish()
    }
}

/// A function whose result is computed by a future
///
/// `calculate` returns an async value object at once; the async execution
/// path of a tree awaits it.
pub struct AsyncFunction {
    name: String,
    returns_array: bool,
    func: AsyncImpl,
}

impl AsyncFunction {
    pub fn new<F, Fut>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<ValueObject>, FunctionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValueObject> + Send + 'static,
    {
        Self {
            name: name.to_uppercase(),
            returns_array: false,
            func: Box::new(move |args, ctx| func(args, ctx).boxed()),
        }
    }

    /// Mark the pending result as array-shaped
    pub fn returning_array(mut self) -> Self {
        self.returns_array = true;
        self
    }
}

impl FunctionExecutor for AsyncFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_async(&self) -> bool {
        true
    }

    fn calculate(&self, args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
        log::debug!("starting async function {}", self.name);
        let pending = AsyncValue::new((self.func)(args.to_vec(), ctx.clone()));
        if self.returns_array {
            ValueObject::AsyncArray(pending)
        } else {
            ValueObject::AsyncScalar(pending)
        }
    }
}

impl fmt::Debug for AsyncFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFunction")
            .field("name", &self.name)
            .field("returns_array", &self.returns_array)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ArrayValue, Primitive};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    fn doubler() -> CustomFunction {
        CustomFunction::new("double", |args| match args.into_iter().next() {
            Some(CustomValue::Scalar(Primitive::Number(n))) => CustomValue::Scalar(Primitive::Number(n * 2.0)),
            Some(CustomValue::Array(rows)) => CustomValue::Array(
                rows.into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|p| match p {
                                Primitive::Number(n) => Primitive::Number(n * 2.0),
                                _ => Primitive::from("#VALUE!"),
                            })
                            .collect()
                    })
                    .collect(),
            ),
            _ => CustomValue::Scalar(Primitive::from("#VALUE!")),
        })
    }

    #[test]
    fn test_custom_function() {
        let f = doubler();
        let ctx = FunctionContext::simple();
        assert_eq!(f.name(), "DOUBLE");
        assert!(f.is_custom());
        assert_eq!(f.calculate(&[ValueObject::Number(4.0)], &ctx), ValueObject::Number(8.0));

        let input = ValueObject::Array(ArrayValue::parse_literal("{1,\"a\"}").unwrap());
        let expected = ValueObject::Array(ArrayValue::parse_literal("{2,#VALUE!}").unwrap());
        assert_eq!(f.calculate(&[input], &ctx), expected);
        assert_eq!(
            f.calculate(&[], &ctx),
            ValueObject::Error(gridcalc_core::CellError::Value)
        );
    }

    #[test]
    fn test_async_function() {
        let f = AsyncFunction::new("later", |args: Vec<ValueObject>, ctx: FunctionContext| async move {
            let first = args.first().cloned().unwrap_or(ValueObject::Null);
            first.plus(&ValueObject::Number(ctx.row as f64))
        });
        let mut ctx = FunctionContext::simple();
        ctx.row = 10;

        assert!(f.is_async());
        let ValueObject::AsyncScalar(pending) = f.calculate(&[ValueObject::Number(1.0)], &ctx) else {
            panic!("expected an async scalar");
        };
        assert_eq!(block_on(pending.resolve()), ValueObject::Number(11.0));

        let f = f.returning_array();
        assert!(matches!(f.calculate(&[], &ctx), ValueObject::AsyncArray(_)));
    }
}
