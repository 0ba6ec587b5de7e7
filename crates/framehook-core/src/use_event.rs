//! Per-frame event queries.
//!
//! [`use_event`] returns every event a source fired since the binding was
//! last read in an earlier frame, each tagged with a 0-based index:
//!
//! ```
//! use framehook_core::{begin_frame, end_frame, use_event, Signal};
//!
//! let key_pressed = Signal::<(&'static str,)>::new();
//!
//! fn handle_keys(source: &Signal<(&'static str,)>) -> Vec<(usize, &'static str)> {
//!     use_event("keyHandler", source)
//!         .map(|(index, (key,))| (index, key))
//!         .collect()
//! }
//!
//! // The first call subscribes.
//! begin_frame().unwrap();
//! assert!(handle_keys(&key_pressed).is_empty());
//! end_frame().unwrap();
//!
//! key_pressed.fire(("A",));
//! key_pressed.fire(("B",));
//!
//! begin_frame().unwrap();
//! assert_eq!(handle_keys(&key_pressed), vec![(0, "A"), (1, "B")]);
//! end_frame().unwrap();
//!
//! key_pressed.fire(("C",));
//!
//! begin_frame().unwrap();
//! assert_eq!(handle_keys(&key_pressed), vec![(0, "C")]);
//! end_frame().unwrap();
//! ```
//!
//! # Call shapes
//!
//! | Call | Discriminator | Source |
//! |------|---------------|--------|
//! | `use_event(key, &signal)` | `key` | a [`Signal`] |
//! | `use_event(key, signal_like)` | `key` | any [`SignalLike`] shape |
//! | `use_event(&owner, Owner::Event)` | the owner's [`InstanceId`] and the event name | the named event |
//!
//! Anything else fails to compile: [`EventSource`] is only implemented for
//! those source types.
//!
//! # Buffering
//!
//! Each binding keeps an ordered buffer of the payloads its source fired. A
//! query yields the records present when it was called; calling again in the
//! same frame yields the same records plus anything fired in between. The
//! first query of a later frame drops everything earlier queries already
//! yielded and restarts indices at 0. Records that arrive after the last
//! query of a frame are kept for the next one.
//!
//! [`InstanceId`]: crate::InstanceId

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::panic::Location;
use std::rc::{Rc, Weak};

use crate::connection::ConnectionLike;
use crate::error::HookError;
use crate::hooks::{current_frame, hook_state_at, runtime_config, OnTypeChange};
use crate::instance::{Instance, InstanceEvent};
use crate::key::{DiscriminatorKey, HookKey};
use crate::signal::Signal;
use crate::source::{AsSignalLike, SignalLike};

const HOOK_NAME: &str = "use_event";

/// One buffered firing: `(index, payload)`.
pub type EventRecord<A> = (usize, A);

// ============================================================================
// Sources
// ============================================================================

/// A discriminator resolved together with the source it observes.
pub struct EventBinding<A> {
    key: DiscriminatorKey,
    source: SignalLike<A>,
    name: Option<&'static str>,
}

impl<A> EventBinding<A> {
    /// Bind `source` under `key`.
    pub fn new(key: DiscriminatorKey, source: SignalLike<A>) -> Self {
        Self {
            key,
            source,
            name: None,
        }
    }

    /// Attach an event name for diagnostics.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }
}

impl<A> fmt::Debug for EventBinding<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("key", &self.key)
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

/// Second argument of [`use_event`], given discriminator type `D`.
pub trait EventSource<D> {
    /// Payload carried by each event.
    type Args: Clone + 'static;

    /// Resolve the binding key and the source to observe.
    fn bind(self, discriminator: D) -> EventBinding<Self::Args>;
}

impl<D, A> EventSource<D> for SignalLike<A>
where
    D: Hash + Eq + 'static,
    A: Clone + 'static,
{
    type Args = A;

    fn bind(self, discriminator: D) -> EventBinding<A> {
        EventBinding::new(DiscriminatorKey::new(discriminator), self)
    }
}

impl<D, A> EventSource<D> for &SignalLike<A>
where
    D: Hash + Eq + 'static,
    A: Clone + 'static,
{
    type Args = A;

    fn bind(self, discriminator: D) -> EventBinding<A> {
        EventBinding::new(DiscriminatorKey::new(discriminator), self.clone())
    }
}

impl<D, A> EventSource<D> for &Signal<A>
where
    D: Hash + Eq + 'static,
    A: Clone + 'static,
{
    type Args = A;

    fn bind(self, discriminator: D) -> EventBinding<A> {
        EventBinding::new(DiscriminatorKey::new(discriminator), self.as_signal_like())
    }
}

impl<'a, I, A> EventSource<&'a I> for InstanceEvent<I, A>
where
    I: Instance + ?Sized,
    A: Clone + 'static,
{
    type Args = A;

    fn bind(self, instance: &'a I) -> EventBinding<A> {
        // Each event of an owner gets its own binding, even from one call site.
        EventBinding::new(
            DiscriminatorKey::new((instance.instance_id(), self.name())),
            self.resolve(instance),
        )
        .named(self.name())
    }
}

// ============================================================================
// Buffer
// ============================================================================

/// Ordered records of one binding, addressed by sequence number.
struct EventBuffer<A> {
    records: VecDeque<A>,
    /// Sequence number of `records[0]`
    front_seq: u64,
    /// Frame of the last read
    frame: Option<u64>,
    /// Sequence number that maps to index 0 in `frame`
    frame_base: u64,
    /// Records below this were yielded during `frame`
    watermark: u64,
    capacity: Option<usize>,
}

impl<A> EventBuffer<A> {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            front_seq: 0,
            frame: None,
            frame_base: 0,
            watermark: 0,
            capacity: capacity.map(|capacity| capacity.max(1)),
        }
    }

    fn end_seq(&self) -> u64 {
        self.front_seq + self.records.len() as u64
    }

    fn push(&mut self, args: A) {
        if let Some(capacity) = self.capacity
            && self.records.len() >= capacity
        {
            self.records.pop_front();
            self.front_seq += 1;
            tracing::warn!(capacity, "event buffer full, dropped oldest record");
        }
        self.records.push_back(args);
    }

    /// Open a read in `frame`, returning the `(base, end)` sequence range.
    fn begin_read(&mut self, frame: u64) -> (u64, u64) {
        if self.frame != Some(frame) {
            while self.front_seq < self.watermark && self.records.pop_front().is_some() {
                self.front_seq += 1;
            }
            self.frame_base = self.front_seq;
            self.frame = Some(frame);
        }

        let end = self.end_seq();
        self.watermark = end;
        (self.frame_base, end)
    }

    fn get(&self, seq: u64) -> Option<&A> {
        let offset = seq.checked_sub(self.front_seq)?;
        self.records.get(usize::try_from(offset).ok()?)
    }
}

// ============================================================================
// Binding state
// ============================================================================

struct EventState<A> {
    source: Option<SignalLike<A>>,
    connection: Option<ConnectionLike>,
    buffer: Rc<RefCell<EventBuffer<A>>>,
}

impl<A: Clone + 'static> EventState<A> {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            source: None,
            connection: None,
            buffer: Rc::new(RefCell::new(EventBuffer::new(capacity))),
        }
    }
}

/// Subscribe `state` to `source` unless it already observes it.
///
/// A different source replaces the old one: the old subscription is
/// disposed and its buffer dropped, so late firings from it land nowhere.
fn subscribe_if_changed<A: Clone + 'static>(
    state: &RefCell<EventState<A>>,
    source: SignalLike<A>,
    location: &'static Location<'static>,
    name: Option<&'static str>,
) {
    let stale = {
        let mut state = state.borrow_mut();
        if state
            .source
            .as_ref()
            .is_some_and(|current| current.same_source(&source))
        {
            return;
        }

        let stale = state.connection.take();
        if state.source.take().is_some() {
            let capacity = state.buffer.borrow().capacity;
            state.buffer = Rc::new(RefCell::new(EventBuffer::new(capacity)));
        }
        stale
    };

    if let Some(stale) = stale {
        tracing::debug!(location = %location, event = name, "event source changed, resubscribing");
        stale.dispose();
    }

    let buffer: Weak<RefCell<EventBuffer<A>>> = Rc::downgrade(&state.borrow().buffer);
    let connection = source.subscribe(Box::new(move |args| {
        if let Some(buffer) = buffer.upgrade() {
            buffer.borrow_mut().push(args);
        }
    }));
    tracing::debug!(
        location = %location,
        event = name,
        shape = source.shape(),
        disposer = connection.shape(),
        "subscribed to event source"
    );

    let mut state = state.borrow_mut();
    state.source = Some(source);
    state.connection = Some(connection);
}

fn dispose_binding<A>(state: Rc<RefCell<EventState<A>>>) {
    let connection = {
        let mut state = state.borrow_mut();
        state.source = None;
        state.connection.take()
    };
    if let Some(connection) = connection {
        connection.dispose();
    }
}

// ============================================================================
// Iterator
// ============================================================================

/// Lazy, finite iterator over the records of one query.
///
/// Yields `(index, payload)` in firing order. Payloads are cloned out of the
/// buffer one at a time, so the source may fire while the iterator is being
/// consumed; those firings show up in the next query, not this one.
pub struct Events<A> {
    buffer: Rc<RefCell<EventBuffer<A>>>,
    base: u64,
    next: u64,
    end: u64,
}

impl<A: Clone> Iterator for Events<A> {
    type Item = EventRecord<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self.buffer.borrow();
        // Records evicted by a bounded buffer are skipped.
        self.next = self.next.max(buffer.front_seq);
        if self.next >= self.end {
            return None;
        }

        let args = buffer.get(self.next)?.clone();
        let index = usize::try_from(self.next - self.base).ok()?;
        self.next += 1;
        Some((index, args))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end.saturating_sub(self.next)).ok();
        (0, remaining)
    }
}

impl<A> fmt::Debug for Events<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("next", &(self.next - self.base))
            .field("end", &(self.end - self.base))
            .finish()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Query the events fired by `event` for the binding keyed by this call site
/// and `discriminator`.
///
/// The first call subscribes. Later calls with the same source reuse the
/// subscription; a call with a different source, including one with another
/// payload type, disposes the old subscription and subscribes to the new
/// one. When a frame ends without touching the binding, the subscription is
/// disposed.
///
/// # Errors
///
/// [`HookError::OutsideFrame`] when no frame is in progress.
#[track_caller]
pub fn try_use_event<D, E>(discriminator: D, event: E) -> Result<Events<E::Args>, HookError>
where
    E: EventSource<D>,
{
    let location = Location::caller();
    let EventBinding { key, source, name } = event.bind(discriminator);

    let state: Rc<RefCell<EventState<E::Args>>> = hook_state_at(
        HOOK_NAME,
        HookKey::new(location, key),
        || Rc::new(RefCell::new(EventState::new(runtime_config().buffer_capacity))),
        dispose_binding,
        OnTypeChange::Replace,
    )?;
    let frame = current_frame().ok_or(HookError::OutsideFrame { hook: HOOK_NAME })?;

    subscribe_if_changed(&state, source, location, name);

    let buffer = Rc::clone(&state.borrow().buffer);
    let (base, end) = buffer.borrow_mut().begin_read(frame);
    Ok(Events {
        buffer,
        base,
        next: base,
        end,
    })
}

/// Like [`try_use_event`], but panics on misuse.
///
/// # Example
///
/// ```ignore
/// for (index, (key,)) in use_event("keyHandler", &key_pressed) {
///     println!("{index}: {key}");
/// }
/// ```
#[track_caller]
pub fn use_event<D, E>(discriminator: D, event: E) -> Events<E::Args>
where
    E: EventSource<D>,
{
    try_use_event(discriminator, event)
        .unwrap_or_else(|err| panic!("framehook hooks error: {err}"))
}
