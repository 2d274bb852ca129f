//! Compilation of a queue into one callable.
//!
//! The queue is folded left to right over a "current" callable:
//!
//! | kind   | current becomes                               |
//! |--------|-----------------------------------------------|
//! | fn     | the step                                      |
//! | after  | `chain(current, step)`, or the step if none   |
//! | before | `chain(step, current)`, or the step if none   |
//! | around | whatever `step(current)` returns, per call    |
//! | fail   | `current` guarded by `step` as error handler  |

use tracing::{debug, trace, warn};

use crate::callable::Callable;
use crate::chain::chain;
use crate::descriptor::{Descriptor, Kind};
use crate::error::Error;
use crate::fail::recover;
use crate::value::Value;
use crate::Result;

/// Reduce `queue` into a single callable.
///
/// An empty queue compiles to a no-op. A queue starting with an `around`
/// descriptor has nothing to wrap and fails with
/// [`Error::AroundWithoutTarget`].
pub fn forge(queue: &[Descriptor]) -> Result<Callable> {
    debug!(len = queue.len(), "forging composition");

    let Some(first) = queue.first() else {
        return Ok(Callable::noop());
    };
    if first.kind() == Kind::Around {
        warn!("composition starts with an around descriptor");
        return Err(Error::AroundWithoutTarget);
    }

    let mut cur: Option<Callable> = None;
    for (position, descriptor) in queue.iter().enumerate() {
        trace!(position, kind = %descriptor.kind(), "forging descriptor");
        let step = descriptor.step().clone();
        cur = Some(match (descriptor.kind(), cur.take()) {
            (Kind::Fn, _) => step,
            (Kind::After, Some(inner)) => chain(inner, step),
            (Kind::Before, Some(inner)) => chain(step, inner),
            (Kind::After | Kind::Before, None) => step,
            (Kind::Around, Some(inner)) => around(inner, step),
            (Kind::Around, None) => return Err(Error::AroundWithoutTarget),
            (Kind::Fail, inner) => guard(inner, step),
        });
    }

    Ok(cur.unwrap_or_else(Callable::noop))
}

/// Let `step` build the replacement of `sup` on every call.
///
/// The step receives `sup` as its only argument and must return a function.
pub fn around(sup: Callable, step: Callable) -> Callable {
    Callable::new(move |args| {
        let wrapper = step.call(vec![Value::Function(sup.clone())])?;
        match wrapper {
            Value::Function(replacement) => replacement.call(args),
            other => {
                warn!(returned = other.type_name(), "around step did not return a function");
                Err(Error::AroundWithoutWrapper)
            }
        }
    })
}

fn guard(protected: Option<Callable>, handler: Callable) -> Callable {
    match protected {
        Some(protected) => Callable::new(move |args| recover(&protected, &handler, args)),
        None => Callable::noop(),
    }
}
