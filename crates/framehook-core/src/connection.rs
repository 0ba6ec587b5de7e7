//! Disposer shapes accepted from event sources.
//!
//! A subscription is terminated by one of a handful of capabilities: a
//! handle that can be disconnected, a handle that can be destroyed, or a bare
//! zero-argument closure. [`ConnectionLike`] is the closed set of those
//! shapes; [`ConnectionLike::dispose`] is the single canonical way to end a
//! subscription regardless of which shape the source handed back.

use std::fmt;

/// A handle that ends its subscription when disconnected.
pub trait Disconnect {
    /// End the subscription.
    fn disconnect(&mut self);
}

/// A handle that ends its subscription when destroyed.
pub trait Destroy {
    /// End the subscription and release the handle.
    fn destroy(&mut self);
}

/// Any of the recognized disposer shapes.
pub enum ConnectionLike {
    /// A handle with a `disconnect` capability.
    Disconnect(Box<dyn Disconnect>),
    /// A handle with a `destroy` capability.
    Destroy(Box<dyn Destroy>),
    /// A bare zero-argument disposer.
    Disposer(Box<dyn FnOnce()>),
}

impl ConnectionLike {
    /// Wrap a disconnectable handle.
    pub fn disconnect<C: Disconnect + 'static>(handle: C) -> Self {
        ConnectionLike::Disconnect(Box::new(handle))
    }

    /// Wrap a destroyable handle.
    pub fn destroy<C: Destroy + 'static>(handle: C) -> Self {
        ConnectionLike::Destroy(Box::new(handle))
    }

    /// Wrap a bare disposer closure.
    pub fn disposer(f: impl FnOnce() + 'static) -> Self {
        ConnectionLike::Disposer(Box::new(f))
    }

    /// A connection with nothing to release.
    pub fn noop() -> Self {
        ConnectionLike::Disposer(Box::new(|| {}))
    }

    /// Name of the shape, for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            ConnectionLike::Disconnect(_) => "disconnect",
            ConnectionLike::Destroy(_) => "destroy",
            ConnectionLike::Disposer(_) => "disposer",
        }
    }

    /// End the subscription.
    ///
    /// Consumes the connection, so a subscription is disposed at most once.
    pub fn dispose(self) {
        match self {
            ConnectionLike::Disconnect(mut handle) => handle.disconnect(),
            ConnectionLike::Destroy(mut handle) => handle.destroy(),
            ConnectionLike::Disposer(f) => f(),
        }
    }
}

impl fmt::Debug for ConnectionLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionLike").field(&self.shape()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Flag(Rc<Cell<u32>>);

    impl Disconnect for Flag {
        fn disconnect(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl Destroy for Flag {
        fn destroy(&mut self) {
            self.0.set(self.0.get() + 10);
        }
    }

    #[test]
    fn every_shape_disposes() {
        let hits = Rc::new(Cell::new(0));

        ConnectionLike::disconnect(Flag(hits.clone())).dispose();
        assert_eq!(hits.get(), 1);

        ConnectionLike::destroy(Flag(hits.clone())).dispose();
        assert_eq!(hits.get(), 11);

        let hits_clone = hits.clone();
        ConnectionLike::disposer(move || hits_clone.set(hits_clone.get() + 100)).dispose();
        assert_eq!(hits.get(), 111);
    }

    #[test]
    fn shape_names() {
        assert_eq!(ConnectionLike::noop().shape(), "disposer");
        let hits = Rc::new(Cell::new(0));
        assert_eq!(ConnectionLike::destroy(Flag(hits)).shape(), "destroy");
    }
}
