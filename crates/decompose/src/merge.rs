//! Combining separately built compositions.
//!
//! All three operators look at their last target first: unless it is a
//! composition there is nothing to decorate, and it is returned as is.
//!
//! - [`up`] layers the targets over each other, mutating the first target
//!   when it is itself a composition.
//! - [`bottom`] slides the other targets underneath the last one, which is
//!   mutated and returned.
//! - [`compile`] does the same on a copy, leaving every target untouched.

use crate::callable::Callable;
use crate::composition::Composition;
use crate::value::Value;
use crate::Result;

/// A merge operand.
#[derive(Debug, Clone, Default)]
pub enum Target {
    /// Nothing; skipped by every operator.
    #[default]
    Absent,
    /// A plain callable: a concrete base, never decorated in place.
    Plain(Callable),
    /// A composition that can receive other targets.
    Composed(Composition),
}

impl Target {
    pub fn as_composition(&self) -> Option<&Composition> {
        match self {
            Target::Composed(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_composition(self) -> Option<Composition> {
        match self {
            Target::Composed(c) => Some(c),
            _ => None,
        }
    }

    /// Invoke the target. An absent target returns `Undefined`.
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        match self {
            Target::Absent => Ok(Value::Undefined),
            Target::Plain(f) => f.call(args),
            Target::Composed(c) => c.call(args),
        }
    }
}

impl From<Callable> for Target {
    fn from(f: Callable) -> Self {
        Target::Plain(f)
    }
}

impl From<Composition> for Target {
    fn from(c: Composition) -> Self {
        Target::Composed(c)
    }
}

impl<T: Into<Target>> From<Option<T>> for Target {
    fn from(target: Option<T>) -> Self {
        target.map(Into::into).unwrap_or_default()
    }
}

/// Layer `targets` so that each one is applied over the next.
///
/// Leading absent targets are skipped. If the first remaining target is a
/// composition, every following target is put on top of it with
/// [`Composition::prepend_foreign`]. Otherwise the last target is renewed as
/// a clone would be, then receives the intermediate targets (innermost last)
/// and finally the first one underneath it.
pub fn up(targets: impl IntoIterator<Item = Target>) -> Target {
    let mut targets: Vec<Target> = targets.into_iter().collect();
    if !matches!(targets.last(), Some(Target::Composed(_))) {
        return targets.pop().unwrap_or_default();
    }

    let start = targets
        .iter()
        .position(|t| !matches!(t, Target::Absent))
        .unwrap_or(0);
    let mut rest = targets.split_off(start).into_iter();
    let Some(head) = rest.next() else {
        return Target::Absent;
    };

    match head {
        Target::Composed(mut receiver) => {
            for target in rest {
                receiver.prepend_foreign(target);
            }
            Target::Composed(receiver)
        }
        head => {
            let mut middle: Vec<Target> = rest.collect();
            let Some(Target::Composed(mut receiver)) = middle.pop() else {
                return head;
            };
            receiver.refresh_vocabulary();
            for target in middle.into_iter().rev() {
                receiver.insert_at_bottom(target);
            }
            receiver.insert_at_bottom(head);
            Target::Composed(receiver)
        }
    }
}

/// Put every other target underneath the last one, in place.
pub fn bottom(targets: impl IntoIterator<Item = Target>) -> Target {
    let mut targets: Vec<Target> = targets.into_iter().collect();
    match targets.pop() {
        Some(Target::Composed(mut receiver)) => {
            for target in targets.into_iter().rev() {
                receiver.insert_at_bottom(target);
            }
            Target::Composed(receiver)
        }
        last => last.unwrap_or_default(),
    }
}

/// Like [`bottom`], on a copy of the last target.
pub fn compile(targets: &[Target]) -> Target {
    let Some((last, layers)) = targets.split_last() else {
        return Target::Absent;
    };
    let Target::Composed(receiver) = last else {
        return last.clone();
    };

    let mut receiver = receiver.clone();
    for target in layers.iter().rev() {
        receiver.insert_at_bottom(target.clone());
    }
    Target::Composed(receiver)
}
