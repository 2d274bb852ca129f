//! Shared step functions.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;
use crate::Result;

type StepFn = dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync;

/// A callable taking positional arguments and returning a value.
///
/// Cloning is cheap and keeps the identity: two clones of the same callable
/// are [`ptr_eq`](Callable::ptr_eq). Returning `Err(Error::Exception(..))`
/// raises an exception.
#[derive(Clone)]
pub struct Callable {
    f: Arc<StepFn>,
}

impl Callable {
    /// Wrap a closure over the full argument list.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Wrap a closure over the first argument (`Undefined` when absent).
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(move |args: Vec<Value>| f(args.into_iter().next().unwrap_or_default()))
    }

    /// A callable that ignores its arguments and returns `Undefined`.
    pub fn noop() -> Self {
        Self::new(|_| Ok(Value::Undefined))
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        (self.f)(args)
    }

    /// Whether both handles refer to the same underlying function.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Arc::as_ptr(&self.f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_identity() {
        let f = Callable::noop();
        let g = f.clone();
        assert!(f.ptr_eq(&g));
        assert!(!f.ptr_eq(&Callable::noop()));
    }

    #[test]
    fn test_unary_receives_first_argument() {
        let f = Callable::unary(Ok);
        assert_eq!(f.call(vec!["a".into(), "b".into()]).unwrap(), Value::from("a"));
        assert_eq!(f.call(vec![]).unwrap(), Value::Undefined);
    }
}
