//! A single-threaded event emitter.
//!
//! [`Signal`] is the built-in event source: listeners register with
//! [`Signal::connect`] and receive a clone of every payload passed to
//! [`Signal::fire`]. It implements the `connect` shape, so it can be handed
//! straight to [`use_event`](crate::use_event).
//!
//! # Example
//!
//! ```
//! use framehook_core::Signal;
//!
//! let key_pressed = Signal::<(String,)>::new();
//!
//! let mut connection = key_pressed.connect(|(key,)| println!("pressed {key}"));
//! key_pressed.fire(("A".to_string(),));
//!
//! connection.disconnect();
//! assert_eq!(key_pressed.listener_count(), 0);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::connection::{ConnectionLike, Disconnect};
use crate::source::{AsSignalLike, Callback, Connect, SignalLike};

type Listener<A> = Rc<dyn Fn(A)>;

/// A multi-listener event emitter.
///
/// Clones share the same listener list. Two signals compare equal only when
/// they are clones of each other.
pub struct Signal<A> {
    inner: Rc<SignalInner<A>>,
}

struct SignalInner<A> {
    /// Weak self-reference handed to connections.
    this: Weak<SignalInner<A>>,
    listeners: RefCell<Vec<(u64, Listener<A>)>>,
    next_id: Cell<u64>,
}

impl<A> SignalInner<A> {
    fn add_listener(&self, listener: Listener<A>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: u64) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn has_listener(&self, id: u64) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(listener_id, _)| *listener_id == id)
    }
}

impl<A: 'static> Signal<A> {
    /// Create a signal with no listeners.
    pub fn new() -> Self {
        Self {
            inner: Rc::new_cyclic(|this| SignalInner {
                this: this.clone(),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register a listener.
    ///
    /// The listener stays registered until the returned [`Connection`] is
    /// disconnected. Dropping the connection does not disconnect.
    pub fn connect(&self, listener: impl Fn(A) + 'static) -> Connection<A> {
        let id = self.inner.add_listener(Rc::new(listener));
        Connection {
            signal: Rc::downgrade(&self.inner),
            id,
        }
    }
}

impl<A> Signal<A> {
    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl<A: Clone> Signal<A> {
    /// Deliver `args` to every listener registered at the time of the call.
    ///
    /// Listeners may connect or disconnect while being notified; those
    /// changes take effect from the next `fire`.
    pub fn fire(&self, args: A) {
        let listeners: Vec<Listener<A>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in listeners {
            listener(args.clone());
        }
    }
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> PartialEq for Signal<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Eq for Signal<A> {}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<A: 'static> Connect<A> for SignalInner<A> {
    fn connect(&self, callback: Callback<A>) -> ConnectionLike {
        let id = self.add_listener(Rc::from(callback));
        ConnectionLike::disconnect(Connection {
            signal: self.this.clone(),
            id,
        })
    }
}

impl<A: 'static> Connect<A> for Signal<A> {
    fn connect(&self, callback: Callback<A>) -> ConnectionLike {
        Connect::connect(&*self.inner, callback)
    }
}

impl<A: 'static> AsSignalLike for Signal<A> {
    type Args = A;

    fn as_signal_like(&self) -> SignalLike<A> {
        // Shares the signal's own allocation so identity is stable across frames.
        SignalLike::Connect(Rc::clone(&self.inner) as Rc<dyn Connect<A>>)
    }
}

impl<A: 'static> From<&Signal<A>> for SignalLike<A> {
    fn from(signal: &Signal<A>) -> Self {
        signal.as_signal_like()
    }
}

/// Handle to one listener registration on a [`Signal`].
///
/// Holds only a weak reference, so it never keeps the signal alive.
pub struct Connection<A> {
    signal: Weak<SignalInner<A>>,
    id: u64,
}

impl<A> Connection<A> {
    /// Whether the listener is still registered.
    pub fn is_connected(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|inner| inner.has_listener(self.id))
    }

    /// Remove the listener. Calling this more than once has no effect.
    pub fn disconnect(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            inner.remove_listener(self.id);
        }
        self.signal = Weak::new();
    }
}

impl<A> Disconnect for Connection<A> {
    fn disconnect(&mut self) {
        Connection::disconnect(self);
    }
}

impl<A> fmt::Debug for Connection<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_reaches_every_listener() {
        let signal = Signal::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = seen.clone();
        let _ca = signal.connect(move |v| a.borrow_mut().push(("a", v)));
        let b = seen.clone();
        let _cb = signal.connect(move |v| b.borrow_mut().push(("b", v)));

        signal.fire(7);

        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let signal = Signal::<()>::new();
        let mut connection = signal.connect(|()| {});
        assert!(connection.is_connected());
        assert_eq!(signal.listener_count(), 1);

        connection.disconnect();
        connection.disconnect();

        assert!(!connection.is_connected());
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn listener_may_disconnect_while_firing() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Connection<()>>>> = Rc::new(RefCell::new(None));

        let hits_clone = hits.clone();
        let slot_clone = slot.clone();
        let connection = signal.connect(move |()| {
            hits_clone.set(hits_clone.get() + 1);
            if let Some(mut connection) = slot_clone.borrow_mut().take() {
                connection.disconnect();
            }
        });
        *slot.borrow_mut() = Some(connection);

        signal.fire(());
        signal.fire(());

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn clones_share_listeners_and_identity() {
        let signal = Signal::<u8>::new();
        let clone = signal.clone();
        let _c = clone.connect(|_| {});

        assert_eq!(signal.listener_count(), 1);
        assert_eq!(signal, clone);
        assert_ne!(signal, Signal::new());
    }

    #[test]
    fn signal_like_view_keeps_identity() {
        let signal = Signal::<u8>::new();
        let a = signal.as_signal_like();
        let b = SignalLike::from(&signal.clone());
        let other = Signal::<u8>::new().as_signal_like();

        assert!(a.same_source(&b));
        assert!(!a.same_source(&other));
    }

    #[test]
    fn connect_shape_disconnects_through_connection_like() {
        let signal = Signal::<u8>::new();
        let connection = signal.as_signal_like().subscribe(Box::new(|_| {}));
        assert_eq!(connection.shape(), "disconnect");
        assert_eq!(signal.listener_count(), 1);

        connection.dispose();
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn signal_wrapped_as_connect_source() {
        let signal = Signal::<u8>::new();
        let source = SignalLike::connect(Rc::new(signal.clone()));
        let connection = source.subscribe(Box::new(|_| {}));
        assert_eq!(signal.listener_count(), 1);

        connection.dispose();
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn connection_does_not_keep_signal_alive() {
        let signal = Signal::<u8>::new();
        let mut connection = signal.connect(|_| {});
        drop(signal);

        assert!(!connection.is_connected());
        connection.disconnect();
    }
}
