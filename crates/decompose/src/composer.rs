//! Composition factories with a custom fluent vocabulary.
//!
//! A [`Composer`] owns a shared set of named [`Extension`]s. Every
//! composition it makes carries a snapshot of that set and answers to its
//! names through [`Composition::apply`]. Members added to the composer later
//! reach compositions made afterwards, including clones of earlier ones; a
//! composition that is never cloned keeps the snapshot it was made with.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::composition::Composition;
use crate::descriptor::Kind;
use crate::merge::Target;
use crate::value::Value;
use crate::Result;

/// A named member of a composer's vocabulary.
///
/// Receives the composition and the call arguments and returns the
/// (usually further decorated) composition.
pub trait Extension: Send + Sync {
    fn extend(&self, composition: Composition, args: &[Value]) -> Result<Composition>;
}

impl<F> Extension for F
where
    F: Fn(Composition, &[Value]) -> Result<Composition> + Send + Sync,
{
    fn extend(&self, composition: Composition, args: &[Value]) -> Result<Composition> {
        self(composition, args)
    }
}

/// An immutable set of named extensions.
#[derive(Clone, Default)]
pub struct Vocabulary {
    members: BTreeMap<String, Arc<dyn Extension>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a closure member.
    pub fn with<F>(mut self, name: impl Into<String>, member: F) -> Self
    where
        F: Fn(Composition, &[Value]) -> Result<Composition> + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(member));
        self
    }

    pub fn insert(&mut self, name: String, member: Arc<dyn Extension>) {
        self.members.insert(name, member);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.members.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Builds compositions pre-extended with a vocabulary.
///
/// Clones of a composer share the same vocabulary.
#[derive(Clone, Default)]
pub struct Composer {
    api: Arc<RwLock<Vocabulary>>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api(api: Vocabulary) -> Self {
        Self {
            api: Arc::new(RwLock::new(api)),
        }
    }

    /// Add a member for every composition made from now on.
    pub fn add<F>(&self, name: impl Into<String>, member: F) -> &Self
    where
        F: Fn(Composition, &[Value]) -> Result<Composition> + Send + Sync + 'static,
    {
        self.add_extension(name, Arc::new(member))
    }

    pub fn add_extension(&self, name: impl Into<String>, member: Arc<dyn Extension>) -> &Self {
        self.api
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), member);
        self
    }

    /// Make a composition from `seed`, as [`Composition::seeded`] with `fn`.
    pub fn make(&self, seed: impl Into<Target>) -> Composition {
        self.make_with_kind(seed, Kind::Fn)
    }

    pub fn make_with_kind(&self, seed: impl Into<Target>, kind: Kind) -> Composition {
        Composition::seeded(seed, kind).with_composer(self)
    }

    pub(crate) fn snapshot(&self) -> Vocabulary {
        self.api.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer").field("api", &self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Callable;
    use crate::error::Error;

    fn tagging() -> Vocabulary {
        Vocabulary::new().with("tag", |c: Composition, args: &[Value]| {
            let tag = args.first().cloned().unwrap_or_default();
            Ok(c.after(Callable::unary(move |v| Ok(format!("{}{}", v, tag).into()))))
        })
    }

    #[test]
    fn test_make_attaches_vocabulary() {
        let composer = Composer::with_api(tagging());
        let comp = composer.make(Callable::unary(Ok)).apply("tag", &["!".into()]).unwrap();
        assert_eq!(comp.call(vec!["hey".into()]).unwrap(), Value::from("hey!"));
    }

    #[test]
    fn test_add_only_reaches_later_compositions() {
        let composer = Composer::new();
        let early = composer.make(Target::Absent);
        composer.add("tag", |c: Composition, _: &[Value]| Ok(c.after(Callable::noop())));
        let late = composer.make(Target::Absent);

        assert!(matches!(early.apply("tag", &[]), Err(Error::UnknownExtension(_))));
        assert!(late.apply("tag", &[]).is_ok());
    }

    #[test]
    fn test_clones_keep_vocabulary() {
        let comp = Composer::with_api(tagging()).make(Target::Absent);
        let copy = comp.clone();
        assert!(copy.vocabulary().is_some_and(|v| v.contains("tag")));
    }

    #[test]
    fn test_clone_reads_current_vocabulary() {
        let composer = Composer::new();
        let early = composer.make(Target::Absent);
        composer.add("tag", |c: Composition, _: &[Value]| Ok(c.after(Callable::noop())));

        assert!(!early.vocabulary().is_some_and(|v| v.contains("tag")));
        assert!(early.clone().vocabulary().is_some_and(|v| v.contains("tag")));
    }

    #[test]
    fn test_clone_without_composer_keeps_its_vocabulary() {
        let comp = Composition::new();
        assert!(comp.clone().vocabulary().is_none());
    }
}
