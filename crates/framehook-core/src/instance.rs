//! Owner objects with named events.
//!
//! An [`Instance`] is an addressable object that owns named events. Each
//! event is exposed as an associated constant of type [`InstanceEvent`], so
//! asking for an event the owner does not declare fails to compile:
//!
//! ```ignore
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     #[instance_id]
//!     id: InstanceId,
//!     #[event]
//!     touched: Signal<(String,)>,
//! }
//!
//! for (index, (who,)) in use_event(&part, Part::Touched) { /* ... */ }
//! // use_event(&part, Part::Clicked);  // error: no associated item named `Clicked`
//! ```
//!
//! The owner itself is the discriminator for this call shape: its
//! [`InstanceId`] together with the event name keys the binding.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::source::SignalLike;

/// Process-unique identity of an [`Instance`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct InstanceId(u64);

/// Global counter for generating unique instance IDs.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

impl InstanceId {
    /// Allocate a new unique ID.
    pub fn new() -> Self {
        InstanceId(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An object that owns named events.
///
/// Usually implemented with `#[derive(Instance)]`.
pub trait Instance {
    /// Identity used as the discriminator when querying this owner's events.
    fn instance_id(&self) -> InstanceId;

    /// Names of the events this owner declares.
    fn event_names(&self) -> &'static [&'static str] {
        &[]
    }
}

/// A typed, statically checked event name on owner type `I`.
///
/// `A` is the payload carried by the event.
pub struct InstanceEvent<I: ?Sized, A> {
    name: &'static str,
    resolve: fn(&I) -> SignalLike<A>,
}

impl<I: ?Sized, A> InstanceEvent<I, A> {
    /// Declare an event named `name`, resolved on an owner by `resolve`.
    pub const fn new(name: &'static str, resolve: fn(&I) -> SignalLike<A>) -> Self {
        Self { name, resolve }
    }

    /// The event name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look the event up on `instance`.
    pub fn resolve(&self, instance: &I) -> SignalLike<A> {
        (self.resolve)(instance)
    }
}

impl<I: ?Sized, A> Clone for InstanceEvent<I, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: ?Sized, A> Copy for InstanceEvent<I, A> {}

impl<I: ?Sized, A> fmt::Debug for InstanceEvent<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceEvent")
            .field("name", &self.name)
            .finish()
    }
}
