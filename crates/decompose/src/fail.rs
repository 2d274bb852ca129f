//! Error recovery around a protected step.
//!
//! Three carriers reach the same handler contract: a raised
//! [`Error::Exception`], a returned [`Value::Error`] and a rejected
//! [`Awaitable`](crate::Awaitable). The handler receives the error value; if
//! it returns `Undefined` the original error is kept, otherwise its return
//! value replaces it.

use tracing::debug;

use crate::callable::Callable;
use crate::error::Error;
use crate::value::Value;
use crate::Result;

/// Invoke `protected` with `args`, routing any error through `handler`.
///
/// Structural errors are not exceptions and propagate untouched.
pub fn recover(protected: &Callable, handler: &Callable, args: Vec<Value>) -> Result<Value> {
    let res = match protected.call(args) {
        Ok(value) => value,
        Err(Error::Exception(thrown)) => thrown,
        Err(structural) => return Err(structural),
    };

    if !res.to_bool() {
        return Ok(res);
    }

    match res {
        Value::Awaitable(pending) => {
            let handler = handler.clone();
            Ok(Value::Awaitable(
                pending.then(Ok, move |reason| consult(&handler, reason)),
            ))
        }
        Value::Error(_) => consult(handler, res),
        other => Ok(other),
    }
}

fn consult(handler: &Callable, error: Value) -> Result<Value> {
    debug!(error = %error, "consulting fail handler");
    let out = handler.call(vec![error.clone()])?;
    Ok(if out.is_undefined() { error } else { out })
}
