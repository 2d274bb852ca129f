//! Deferred values.
//!
//! An [`Awaitable`] is a shared future settling to `Result<Value>`: `Ok` is a
//! fulfillment, `Err(Error::Exception(reason))` a rejection. Continuations
//! registered with [`Awaitable::then`] build new awaitables; nothing runs
//! until the host awaits the result, and the library never spawns tasks.

use std::fmt;
use std::future::{Future, IntoFuture};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::oneshot;

use crate::error::Error;
use crate::value::Value;
use crate::Result;

type Settlement = BoxFuture<'static, Result<Value>>;

/// A value that becomes available later.
///
/// Clones observe the same settlement.
#[derive(Clone)]
pub struct Awaitable {
    inner: Shared<Settlement>,
}

/// The write side of [`Awaitable::deferred`].
///
/// Dropping it without settling leaves the awaitable pending forever.
pub struct Resolver {
    tx: oneshot::Sender<Result<Value>>,
}

impl Awaitable {
    /// Wrap a future.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            inner: fut.boxed().shared(),
        }
    }

    /// An awaitable already fulfilled with `value`.
    pub fn resolved(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(async move { Ok(value) })
    }

    /// An awaitable already rejected with `reason`.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        let reason = reason.into();
        Self::new(async move { Err(Error::Exception(reason)) })
    }

    /// A pending awaitable plus the handle that settles it.
    pub fn deferred() -> (Self, Resolver) {
        let (tx, rx) = oneshot::channel();
        let awaitable = Self::new(async move {
            match rx.await {
                Ok(settled) => settled,
                Err(_) => futures::future::pending().await,
            }
        });
        (awaitable, Resolver { tx })
    }

    /// Register success and failure continuations.
    ///
    /// `on_fulfilled` receives the value, `on_rejected` the rejection reason.
    /// Whatever the selected branch returns settles the new awaitable; a
    /// returned awaitable is awaited in turn. Structural errors bypass both
    /// branches.
    pub fn then<S, R>(&self, on_fulfilled: S, on_rejected: R) -> Self
    where
        S: FnOnce(Value) -> Result<Value> + Send + 'static,
        R: FnOnce(Value) -> Result<Value> + Send + 'static,
    {
        let source = self.inner.clone();
        Self::new(async move {
            let next = match source.await {
                Ok(value) => on_fulfilled(value),
                Err(Error::Exception(reason)) => on_rejected(reason),
                Err(structural) => Err(structural),
            };
            flatten(next).await
        })
    }

    /// Register a success continuation; rejections pass through.
    pub fn map<S>(&self, on_fulfilled: S) -> Self
    where
        S: FnOnce(Value) -> Result<Value> + Send + 'static,
    {
        self.then(on_fulfilled, |reason| Err(Error::Exception(reason)))
    }

    /// The settlement, if it has already been observed.
    pub fn peek(&self) -> Option<&Result<Value>> {
        self.inner.peek()
    }

    pub fn ptr_eq(&self, other: &Awaitable) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

async fn flatten(mut next: Result<Value>) -> Result<Value> {
    loop {
        match next {
            Ok(Value::Awaitable(pending)) => next = pending.inner.await,
            settled => return settled,
        }
    }
}

impl IntoFuture for Awaitable {
    type Output = Result<Value>;
    type IntoFuture = Shared<Settlement>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

impl PartialEq for Awaitable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Awaitable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.peek().is_some() { "settled" } else { "pending" };
        write!(f, "Awaitable({})", state)
    }
}

impl Resolver {
    pub fn resolve(self, value: impl Into<Value>) {
        // Nobody is waiting if the awaitable was dropped.
        let _ = self.tx.send(Ok(value.into()));
    }

    pub fn reject(self, reason: impl Into<Value>) {
        let _ = self.tx.send(Err(Error::Exception(reason.into())));
    }
}
