//! Sequencing of two steps.
//!
//! `chain(first, second)` runs `first`, then feeds its result to `second`:
//!
//! - an error value returned by `first` is returned as is and `second` is
//!   skipped;
//! - `Undefined` forwards the original arguments, [`Value::Args`] forwards
//!   its elements as positional arguments, anything else is forwarded as
//!   the single argument;
//! - if `second` returns `Undefined`, the result of `first` is kept.
//!
//! Awaitable results suspend the remainder of the sequence into a
//! continuation.

use crate::callable::Callable;
use crate::value::Value;
use crate::Result;

/// Run `first` then `second`, forwarding results between them.
pub fn chain(first: Callable, second: Callable) -> Callable {
    Callable::new(move |args: Vec<Value>| {
        let r = first.call(args.clone())?;
        match r {
            Value::Error(_) => Ok(r),
            Value::Awaitable(pending) => {
                let second = second.clone();
                Ok(Value::Awaitable(
                    pending.map(move |resolved| follow(resolved, &second, args)),
                ))
            }
            r => follow(r, &second, args),
        }
    })
}

fn follow(r: Value, second: &Callable, args: Vec<Value>) -> Result<Value> {
    let r2 = second.call(forward(&r, args))?;
    match r2 {
        Value::Awaitable(pending) => Ok(Value::Awaitable(
            pending.map(move |r2| Ok(keep_unless_defined(r, r2))),
        )),
        r2 => Ok(keep_unless_defined(r, r2)),
    }
}

/// Arguments for the step following one that returned `r`.
fn forward(r: &Value, original: Vec<Value>) -> Vec<Value> {
    match r {
        Value::Undefined => original,
        Value::Args(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn keep_unless_defined(prior: Value, next: Value) -> Value {
    if next.is_undefined() {
        prior
    } else {
        next
    }
}
