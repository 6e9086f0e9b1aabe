//! Pending value objects

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::ValueObject;

static NEXT_ASYNC_ID: AtomicU64 = AtomicU64::new(1);

/// A computation that will produce a value object
///
/// The future is shared, so clones of the same pending value resolve once.
/// Two async values are equal when they wrap the same computation.
#[derive(Clone)]
pub struct AsyncValue {
    id: u64,
    future: Shared<BoxFuture<'static, ValueObject>>,
}

impl AsyncValue {
    /// Wrap a future
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = ValueObject> + Send + 'static,
    {
        Self {
            id: NEXT_ASYNC_ID.fetch_add(1, Ordering::Relaxed),
            future: future.boxed().shared(),
        }
    }

    /// An async value that is already resolved
    pub fn ready(value: ValueObject) -> Self {
        Self::new(futures::future::ready(value))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Await the inner value
    pub async fn resolve(&self) -> ValueObject {
        self.future.clone().await
    }

    /// The inner value if the future has already completed
    pub fn peek(&self) -> Option<ValueObject> {
        self.future.peek().cloned()
    }
}

impl PartialEq for AsyncValue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for AsyncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValue")
            .field("id", &self.id)
            .field("resolved", &self.future.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_resolve_shared() {
        let value = AsyncValue::new(async { ValueObject::Number(42.0) });
        let copy = value.clone();
        assert_eq!(value, copy);
        assert_eq!(value.peek(), None);

        assert_eq!(block_on(value.resolve()), ValueObject::Number(42.0));
        assert_eq!(copy.peek(), Some(ValueObject::Number(42.0)));
    }

    #[test]
    fn test_distinct_values_are_not_equal() {
        let a = AsyncValue::ready(ValueObject::Null);
        let b = AsyncValue::ready(ValueObject::Null);
        assert_ne!(a, b);
    }
}
