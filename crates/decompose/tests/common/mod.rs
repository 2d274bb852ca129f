//! Shared helpers for the integration tests.
#![allow(dead_code)]

use decompose::{Awaitable, Callable, Value};
use tracing_subscriber::EnvFilter;

/// Route library log events to the test writer, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn num(v: &Value) -> f64 {
    v.as_f64()
        .unwrap_or_else(|| panic!("Expected Number, got {:?}", v))
}

/// A unary numeric step.
pub fn arith(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Callable {
    Callable::unary(move |v| Ok(Value::from(f(num(&v)))))
}

/// A unary step appending `s` to the string form of its argument.
pub fn suffix(s: &'static str) -> Callable {
    Callable::unary(move |v| Ok(format!("{}{}", v, s).into()))
}

pub fn message(v: &Value) -> String {
    v.as_error()
        .map(|e| e.message().to_string())
        .unwrap_or_else(|| panic!("Expected Error, got {:?}", v))
}

/// An awaitable fulfilled with `value` from a separate task.
pub fn delayed(value: impl Into<Value>) -> Awaitable {
    let value = value.into();
    let (awaitable, resolver) = Awaitable::deferred();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        resolver.resolve(value);
    });
    awaitable
}

/// An awaitable rejected with `reason` from a separate task.
pub fn delayed_rejection(reason: impl Into<Value>) -> Awaitable {
    let reason = reason.into();
    let (awaitable, resolver) = Awaitable::deferred();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        resolver.reject(reason);
    });
    awaitable
}

/// Await `value` if it is an awaitable, failing the test otherwise.
pub async fn settle(value: Value) -> Value {
    match value {
        Value::Awaitable(pending) => pending.await.expect("awaitable rejected"),
        other => panic!("Expected Awaitable, got {:?}", other),
    }
}
