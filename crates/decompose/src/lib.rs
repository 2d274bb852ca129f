//! Chainable function composition.
//!
//! A [`Composition`] collects `before`, `after`, `around` and `fail`
//! decorators around an optional base step and compiles them lazily into one
//! [`Callable`]. Results flow between steps by explicit rules: returning
//! nothing passes the arguments (or the previous result) along,
//! [`Value::arguments`] spreads a sequence into positional arguments, error
//! values short-circuit to the nearest `fail` handler. A step returning an
//! [`Awaitable`] suspends the rest of the composition into a continuation.
//!
//! ```
//! use decompose::{Callable, Composition, Value};
//!
//! let plus_three = Callable::unary(|v| Ok((v.as_f64().unwrap_or_default() + 3.0).into()));
//! let third = Callable::unary(|v| Ok((v.as_f64().unwrap_or_default() / 3.0).into()));
//!
//! let f = Composition::from_fn(plus_three).after(third);
//! assert_eq!(f.call(vec![Value::from(12)]).unwrap(), Value::from(5));
//! ```
//!
//! Compositions built separately are combined with the [`merge`] operators,
//! and [`Composer`] makes compositions that answer to a custom vocabulary.

mod awaitable;
mod callable;
mod chain;
mod composer;
mod composition;
mod descriptor;
mod error;
mod fail;
mod forge;
pub mod merge;
mod value;

pub use awaitable::{Awaitable, Resolver};
pub use callable::Callable;
pub use chain::chain;
pub use composer::{Composer, Extension, Vocabulary};
pub use composition::Composition;
pub use descriptor::{Descriptor, Kind, Queue};
pub use error::Error;
pub use fail::recover;
pub use forge::{around, forge};
pub use merge::{bottom, compile, up, Target};
pub use value::{ErrorValue, Value};

/// Result type for composition operations.
pub type Result<T> = std::result::Result<T, Error>;
