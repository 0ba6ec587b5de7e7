//! Subscriber shapes accepted by [`use_event`](crate::use_event).
//!
//! An event source is anything that can register a callback and hand back a
//! [`ConnectionLike`]. Three shapes are recognized:
//!
//! | Shape | Rust form |
//! |-------|-----------|
//! | `Connect(callback)` / `connect(callback)` | [`Connect`] |
//! | `on(callback)` | [`On`] |
//! | bare subscribe function | `Fn(Callback<A>) -> ConnectionLike` |
//!
//! [`SignalLike`] is the closed union of the three. Its
//! [`subscribe`](SignalLike::subscribe) method is the normalization step:
//! whichever shape was supplied, the hook only ever calls `subscribe` and
//! later [`ConnectionLike::dispose`].
//!
//! The payload type `A` is a single type parameter. Events with several
//! arguments use a tuple, e.g. `SignalLike<(String, u32)>`.

use std::fmt;
use std::rc::Rc;

use crate::connection::ConnectionLike;

/// Callback invoked with one event payload.
pub type Callback<A> = Box<dyn Fn(A)>;

type SubscribeFn<A> = dyn Fn(Callback<A>) -> ConnectionLike;

/// A source exposing a `connect` registration method.
pub trait Connect<A> {
    /// Register `callback` and return the handle that ends the subscription.
    fn connect(&self, callback: Callback<A>) -> ConnectionLike;
}

/// A source exposing an `on` registration method.
pub trait On<A> {
    /// Register `callback` and return the handle that ends the subscription.
    fn on(&self, callback: Callback<A>) -> ConnectionLike;
}

/// Any of the recognized subscriber shapes.
///
/// Identity matters: the hook compares the source it subscribed to with the
/// source passed on later frames using [`same_source`](Self::same_source),
/// which is pointer identity of the shared value. Build a `SignalLike` once
/// and clone it (clones keep identity); constructing a fresh one every frame
/// makes the hook resubscribe every frame.
pub enum SignalLike<A> {
    /// A source with a `connect` method.
    Connect(Rc<dyn Connect<A>>),
    /// A source with an `on` method.
    On(Rc<dyn On<A>>),
    /// A bare subscribe function.
    Subscribe(Rc<SubscribeFn<A>>),
}

impl<A: 'static> SignalLike<A> {
    /// Wrap a source with a `connect` method.
    pub fn connect<S: Connect<A> + 'static>(source: Rc<S>) -> Self {
        SignalLike::Connect(source)
    }

    /// Wrap a source with an `on` method.
    pub fn on<S: On<A> + 'static>(source: Rc<S>) -> Self {
        SignalLike::On(source)
    }

    /// Wrap a bare subscribe function.
    pub fn from_fn(subscribe: impl Fn(Callback<A>) -> ConnectionLike + 'static) -> Self {
        SignalLike::Subscribe(Rc::new(subscribe))
    }

    /// Register `callback` through whichever shape this source has.
    pub fn subscribe(&self, callback: Callback<A>) -> ConnectionLike {
        match self {
            SignalLike::Connect(source) => source.connect(callback),
            SignalLike::On(source) => source.on(callback),
            SignalLike::Subscribe(subscribe) => subscribe(callback),
        }
    }
}

impl<A> SignalLike<A> {
    /// Whether `self` and `other` are the same underlying source.
    pub fn same_source(&self, other: &Self) -> bool {
        match (self, other) {
            (SignalLike::Connect(a), SignalLike::Connect(b)) => {
                Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
            }
            (SignalLike::On(a), SignalLike::On(b)) => {
                Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
            }
            (SignalLike::Subscribe(a), SignalLike::Subscribe(b)) => {
                Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
            }
            _ => false,
        }
    }

    /// Name of the shape, for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            SignalLike::Connect(_) => "connect",
            SignalLike::On(_) => "on",
            SignalLike::Subscribe(_) => "subscribe",
        }
    }
}

impl<A> Clone for SignalLike<A> {
    fn clone(&self) -> Self {
        match self {
            SignalLike::Connect(source) => SignalLike::Connect(Rc::clone(source)),
            SignalLike::On(source) => SignalLike::On(Rc::clone(source)),
            SignalLike::Subscribe(subscribe) => SignalLike::Subscribe(Rc::clone(subscribe)),
        }
    }
}

impl<A> fmt::Debug for SignalLike<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignalLike").field(&self.shape()).finish()
    }
}

/// Values that can lend a [`SignalLike`] with stable identity.
///
/// Fields marked `#[event]` in a `#[derive(Instance)]` struct must implement
/// this trait; the associated `Args` type is the event payload.
pub trait AsSignalLike {
    /// Payload carried by each event.
    type Args;

    /// Borrow this value as a subscribable source.
    fn as_signal_like(&self) -> SignalLike<Self::Args>;
}

impl<A> AsSignalLike for SignalLike<A> {
    type Args = A;

    fn as_signal_like(&self) -> SignalLike<A> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// A source that records callbacks and uses the `on` shape.
    #[derive(Default)]
    struct Emitter {
        callbacks: RefCell<Vec<Callback<u32>>>,
    }

    impl Emitter {
        fn emit(&self, value: u32) {
            for callback in self.callbacks.borrow().iter() {
                callback(value);
            }
        }
    }

    impl On<u32> for Emitter {
        fn on(&self, callback: Callback<u32>) -> ConnectionLike {
            self.callbacks.borrow_mut().push(callback);
            ConnectionLike::noop()
        }
    }

    #[test]
    fn subscribe_dispatches_to_on() {
        let emitter = Rc::new(Emitter::default());
        let source = SignalLike::on(emitter.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _connection = source.subscribe(Box::new(move |v: u32| seen_clone.borrow_mut().push(v)));
        emitter.emit(3);
        emitter.emit(4);

        assert_eq!(*seen.borrow(), vec![3, 4]);
        assert_eq!(source.shape(), "on");
    }

    #[test]
    fn subscribe_dispatches_to_bare_function() {
        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        let source = SignalLike::<()>::from_fn(move |callback| {
            *calls_clone.borrow_mut() += 1;
            callback(());
            ConnectionLike::noop()
        });

        source.subscribe(Box::new(|()| {})).dispose();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn identity_follows_the_shared_source() {
        let emitter = Rc::new(Emitter::default());
        let a = SignalLike::on(emitter.clone());
        let b = a.clone();
        let c = SignalLike::on(emitter);
        let other = SignalLike::on(Rc::new(Emitter::default()));

        assert!(a.same_source(&b));
        // Same Rc, wrapped again: still the same source.
        assert!(a.same_source(&c));
        assert!(!a.same_source(&other));
    }

    #[test]
    fn different_shapes_are_different_sources() {
        let a = SignalLike::<u32>::from_fn(|_| ConnectionLike::noop());
        let b = SignalLike::on(Rc::new(Emitter::default()));
        assert!(!a.same_source(&b));
    }
}
