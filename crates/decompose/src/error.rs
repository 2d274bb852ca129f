//! Error types for composition and invocation.

use thiserror::Error;

use crate::value::Value;

/// Errors raised while compiling or invoking a composition.
///
/// `Exception` is the only variant a step is expected to produce: it models
/// a raised exception and propagates with `?` until a fail handler turns it
/// back into a plain result. Every other variant is structural misuse and is
/// never recovered.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("uncaught exception: {0}")]
    Exception(Value),

    #[error("composition starting with 'around' : could not be compiled. aborting.")]
    AroundWithoutTarget,

    #[error(".around() composition is used without returning a function. aborting.")]
    AroundWithoutWrapper,

    #[error("composition unrecognised : {0}")]
    UnrecognisedKind(String),

    #[error("no extension named '{0}' in this composition's vocabulary")]
    UnknownExtension(String),
}

impl Error {
    /// Raise `value` as an exception.
    pub fn throw(value: impl Into<Value>) -> Self {
        Error::Exception(value.into())
    }

    /// True for errors that signal misuse of the composition itself.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Error::Exception(_))
    }
}
