//! Keys identifying one hook binding across frames.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::Location;

/// Object-safe view of a `Hash + Eq` value.
trait DynKey {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn type_name(&self) -> &'static str;
}

impl<T: Hash + Eq + 'static> DynKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A type-erased discriminator.
///
/// Equality is exact: two keys are equal only when they wrap values of the
/// same type that compare equal. `"a"` and `String::from("a")` are different
/// discriminators.
pub struct DiscriminatorKey {
    inner: Box<dyn DynKey>,
}

impl DiscriminatorKey {
    /// Wrap any hashable value as a discriminator.
    pub fn new<T: Hash + Eq + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
        }
    }

    /// Name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for DiscriminatorKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.dyn_eq(&*other.inner)
    }
}

impl Eq for DiscriminatorKey {}

impl Hash for DiscriminatorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.dyn_hash(state);
    }
}

impl fmt::Debug for DiscriminatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiscriminatorKey")
            .field(&self.type_name())
            .finish()
    }
}

/// Call site plus discriminator.
///
/// The same discriminator observed from two call sites yields two
/// independent bindings.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HookKey {
    /// Source location of the hook call.
    pub location: &'static Location<'static>,
    /// Caller-chosen identity of the binding.
    pub discriminator: DiscriminatorKey,
}

impl HookKey {
    /// Build a key for the given call site.
    pub fn new(location: &'static Location<'static>, discriminator: DiscriminatorKey) -> Self {
        Self {
            location,
            discriminator,
        }
    }
}
