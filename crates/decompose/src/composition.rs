//! The composition wrapper: a queue of descriptors plus its compiled form.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug_span;

use crate::callable::Callable;
use crate::composer::{Composer, Vocabulary};
use crate::descriptor::{Descriptor, Kind, Queue};
use crate::error::Error;
use crate::forge::forge;
use crate::merge::Target;
use crate::value::Value;
use crate::Result;

/// An ordered set of decorators around an optional base step.
///
/// The queue is compiled lazily on first call and the result cached until
/// the queue changes. Cloning copies the queue; the clone compiles on its
/// own and later changes to either side are not shared. A composition made
/// by a [`Composer`] is cloned the way the composer makes one: the clone
/// answers to the composer's vocabulary as it is at cloning time.
pub struct Composition {
    queue: Queue,
    forged: OnceLock<Callable>,
    label: Option<String>,
    vocabulary: Option<Arc<Vocabulary>>,
    composer: Option<Composer>,
}

impl Composition {
    /// An empty composition. Its base may be supplied later by a merge.
    pub fn new() -> Self {
        Self::from_descriptors(Vec::new())
    }

    /// A composition whose base is `step`.
    pub fn from_fn(step: Callable) -> Self {
        Self::with_kind(step, Kind::Fn)
    }

    /// A composition holding `step` as its only descriptor, attached as `kind`.
    pub fn with_kind(step: Callable, kind: Kind) -> Self {
        Self::from_descriptors(vec![Descriptor::new(step, kind)])
    }

    /// A composition over a copy of `descriptors`.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        Self {
            queue: descriptors.into_iter().collect(),
            forged: OnceLock::new(),
            label: None,
            vocabulary: None,
            composer: None,
        }
    }

    /// Build from any seed: nothing, a plain callable attached as `kind`, or
    /// another composition whose queue is taken over.
    pub fn seeded(seed: impl Into<Target>, kind: Kind) -> Self {
        match seed.into() {
            Target::Absent => Self::new(),
            Target::Plain(step) => Self::with_kind(step, kind),
            Target::Composed(other) => Self::from_descriptors(other.queue),
        }
    }

    /// Attach a label reported in log events.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Append a descriptor and drop the compiled form.
    pub fn push(&mut self, kind: Kind, step: Callable) {
        self.queue.push(Descriptor::new(step, kind));
        self.invalidate();
    }

    pub fn after(mut self, step: Callable) -> Self {
        self.push(Kind::After, step);
        self
    }

    pub fn before(mut self, step: Callable) -> Self {
        self.push(Kind::Before, step);
        self
    }

    pub fn around(mut self, step: Callable) -> Self {
        self.push(Kind::Around, step);
        self
    }

    pub fn fail(mut self, step: Callable) -> Self {
        self.push(Kind::Fail, step);
        self
    }

    /// Alias of [`after`](Self::after).
    pub fn done(self, step: Callable) -> Self {
        self.after(step)
    }

    /// Run `step` on success and on failure.
    ///
    /// The step is queued both as `after` and as `fail`, so it must accept
    /// either the success value (or the original arguments) or the error
    /// value.
    pub fn always(mut self, step: Callable) -> Self {
        self.push(Kind::After, step.clone());
        self.push(Kind::Fail, step);
        self
    }

    /// The queued descriptors.
    pub fn queue(&self) -> &[Descriptor] {
        &self.queue
    }

    /// A copy of the queue.
    pub fn clone_queue(&self) -> Queue {
        self.queue.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Compile now, reusing the cached callable while the queue is unchanged.
    pub fn compile_now(&self) -> Result<Callable> {
        if let Some(forged) = self.forged.get() {
            return Ok(forged.clone());
        }
        let _span = debug_span!("compose", label = self.label.as_deref().unwrap_or("-")).entered();
        let forged = forge(&self.queue)?;
        Ok(self.forged.get_or_init(|| forged).clone())
    }

    /// Invoke the compiled composition.
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.compile_now()?.call(args)
    }

    /// Put `target` on top of this composition.
    ///
    /// A plain callable replaces the whole queue as the new base; a
    /// composition has its descriptors appended after the current ones.
    pub fn prepend_foreign(&mut self, target: Target) {
        match target {
            Target::Absent => return,
            Target::Plain(step) => self.queue = vec![Descriptor::new(step, Kind::Fn)],
            Target::Composed(other) => self.queue.extend(other.queue),
        }
        self.invalidate();
    }

    /// Put `target` underneath this composition.
    ///
    /// Does nothing once the queue starts with a base (`fn`) descriptor.
    pub fn insert_at_bottom(&mut self, target: Target) {
        if self.has_base() {
            return;
        }
        match target {
            Target::Absent => return,
            Target::Plain(step) => self.queue.insert(0, Descriptor::new(step, Kind::Fn)),
            Target::Composed(other) => {
                let mut queue = other.queue;
                queue.append(&mut self.queue);
                self.queue = queue;
            }
        }
        self.invalidate();
    }

    /// Whether the queue already starts with a concrete base step.
    pub fn has_base(&self) -> bool {
        matches!(self.queue.first(), Some(d) if d.kind() == Kind::Fn)
    }

    /// Run the vocabulary member `name` on this composition.
    pub fn apply(self, name: &str, args: &[Value]) -> Result<Self> {
        let extension = self
            .vocabulary
            .as_ref()
            .and_then(|vocabulary| vocabulary.get(name))
            .cloned()
            .ok_or_else(|| Error::UnknownExtension(name.to_string()))?;
        extension.extend(self, args)
    }

    /// Names this composition answers to through [`apply`](Self::apply).
    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_deref()
    }

    pub(crate) fn with_composer(mut self, composer: &Composer) -> Self {
        self.composer = Some(composer.clone());
        self.refresh_vocabulary();
        self
    }

    /// Re-read the vocabulary of the originating composer, if any.
    pub(crate) fn refresh_vocabulary(&mut self) {
        if let Some(composer) = &self.composer {
            self.vocabulary = Some(Arc::new(composer.snapshot()));
        }
    }

    fn invalidate(&mut self) {
        self.forged = OnceLock::new();
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Composition {
    fn clone(&self) -> Self {
        let mut clone = Self {
            queue: self.queue.clone(),
            forged: OnceLock::new(),
            label: self.label.clone(),
            vocabulary: self.vocabulary.clone(),
            composer: self.composer.clone(),
        };
        clone.refresh_vocabulary();
        clone
    }
}

impl fmt::Debug for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self.queue.iter().map(|d| d.kind().as_str()).collect();
        f.debug_struct("Composition")
            .field("label", &self.label)
            .field("queue", &kinds)
            .field("compiled", &self.forged.get().is_some())
            .finish()
    }
}

impl From<Callable> for Composition {
    fn from(step: Callable) -> Self {
        Self::from_fn(step)
    }
}

impl From<Composition> for Callable {
    fn from(composition: Composition) -> Self {
        Callable::new(move |args| composition.call(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_is_cached_until_mutation() {
        let comp = Composition::from_fn(Callable::unary(Ok)).after(Callable::noop());
        let first = comp.compile_now().unwrap();
        comp.call(vec![Value::from(12)]).unwrap();
        assert!(first.ptr_eq(&comp.compile_now().unwrap()));

        let comp = comp.before(Callable::noop());
        assert!(!first.ptr_eq(&comp.compile_now().unwrap()));
    }

    #[test]
    fn test_clone_does_not_share_queue() {
        let source = Composition::new().after(Callable::noop());
        let clone = source.clone().before(Callable::noop());
        assert_eq!(source.queue().len(), 1);
        assert_eq!(clone.queue().len(), 2);
    }

    #[test]
    fn test_from_descriptors_copies() {
        let descriptors = vec![Descriptor::new(Callable::noop(), Kind::After)];
        let comp = Composition::from_descriptors(descriptors.clone()).fail(Callable::noop());
        assert_eq!(descriptors.len(), 1);
        assert_eq!(comp.queue().len(), 2);
    }

    #[test]
    fn test_always_queues_after_and_fail() {
        let comp = Composition::new().always(Callable::noop());
        let kinds: Vec<Kind> = comp.queue().iter().map(Descriptor::kind).collect();
        assert_eq!(kinds, vec![Kind::After, Kind::Fail]);
        assert!(comp.queue()[0].step().ptr_eq(comp.queue()[1].step()));
    }

    #[test]
    fn test_done_is_after() {
        let comp = Composition::new().done(Callable::noop());
        assert_eq!(comp.queue()[0].kind(), Kind::After);
    }

    #[test]
    fn test_insert_at_bottom_refuses_over_base() {
        let base = Callable::unary(Ok);
        let mut comp = Composition::from_fn(base.clone());
        comp.insert_at_bottom(Target::Plain(Callable::noop()));
        assert_eq!(comp.queue().len(), 1);
        assert!(comp.queue()[0].step().ptr_eq(&base));
    }

    #[test]
    fn test_insert_at_bottom_on_empty_queue() {
        let mut comp = Composition::new();
        comp.insert_at_bottom(Target::Plain(Callable::unary(Ok)));
        assert!(comp.has_base());
        assert_eq!(comp.call(vec!["x".into()]).unwrap(), Value::from("x"));
    }

    #[test]
    fn test_prepend_foreign_plain_replaces_queue() {
        let mut comp = Composition::new().after(Callable::noop()).before(Callable::noop());
        comp.prepend_foreign(Target::Plain(Callable::unary(Ok)));
        assert_eq!(comp.queue().len(), 1);
        assert!(comp.has_base());
    }

    #[test]
    fn test_prepend_foreign_composition_appends() {
        let mut comp = Composition::new().after(Callable::noop());
        comp.prepend_foreign(Target::Composed(Composition::new().fail(Callable::noop())));
        let kinds: Vec<Kind> = comp.queue().iter().map(Descriptor::kind).collect();
        assert_eq!(kinds, vec![Kind::After, Kind::Fail]);
    }

    #[test]
    fn test_seeded_from_composition_takes_queue() {
        let inner = Composition::from_fn(Callable::unary(Ok)).after(Callable::noop());
        let comp = Composition::seeded(inner, Kind::Fn);
        assert_eq!(comp.queue().len(), 2);
    }

    #[test]
    fn test_unknown_extension() {
        let err = Composition::new().apply("foo", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownExtension(name) if name == "foo"));
    }
}
