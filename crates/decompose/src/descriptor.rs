//! Queue elements.

use std::fmt;
use std::str::FromStr;

use crate::callable::Callable;
use crate::error::Error;

/// How a step attaches to what was compiled before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Replaces everything compiled so far.
    Fn,
    /// Runs after, receiving the previous result.
    After,
    /// Runs before, its result feeding what was compiled so far.
    Before,
    /// Receives what was compiled so far and returns its replacement.
    Around,
    /// Handles errors of what was compiled so far.
    Fail,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Fn => "fn",
            Kind::After => "after",
            Kind::Before => "before",
            Kind::Around => "around",
            Kind::Fail => "fail",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fn" => Ok(Kind::Fn),
            "after" | "done" => Ok(Kind::After),
            "before" => Ok(Kind::Before),
            "around" => Ok(Kind::Around),
            "fail" => Ok(Kind::Fail),
            other => Err(Error::UnrecognisedKind(other.to_string())),
        }
    }
}

/// One queue element: a step and the way it attaches.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    step: Callable,
    kind: Kind,
}

impl Descriptor {
    pub fn new(step: Callable, kind: Kind) -> Self {
        Self { step, kind }
    }

    pub fn step(&self) -> &Callable {
        &self.step
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Ordered descriptors owned by one composition.
pub type Queue = Vec<Descriptor>;
