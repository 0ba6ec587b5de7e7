//! Hook state table and frame lifecycle.
//!
//! Hooks let per-frame code keep state across frames without owning it. The
//! state lives in a per-thread [`HookRegistry`], keyed by the call site of the
//! hook plus a caller-chosen discriminator, and is torn down by the registry
//! when the binding stops being used.
//!
//! # Frames
//!
//! A frame is the unit of work between [`begin_frame`] and [`end_frame`].
//! Hooks may only be called while a frame is in progress. When a frame ends,
//! every binding that was not touched during it is torn down and its cleanup
//! runs (see [`RuntimeConfig::teardown_unused`]).
//!
//! ```
//! use framehook_core::{begin_frame, end_frame, use_hook_state};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! fn system() -> u32 {
//!     let counter = use_hook_state("frames seen", || Rc::new(Cell::new(0)), |_| {});
//!     counter.set(counter.get() + 1);
//!     counter.get()
//! }
//!
//! begin_frame().unwrap();
//! assert_eq!(system(), 1);
//! end_frame().unwrap();
//!
//! begin_frame().unwrap();
//! assert_eq!(system(), 2);
//! end_frame().unwrap();
//! ```
//!
//! # Keys
//!
//! A binding is identified by a [`HookKey`]: the source location of the hook
//! call (captured with `#[track_caller]`) and the discriminator. Calling the
//! same hook from two places, or from one place with two discriminators,
//! creates two independent bindings. Calling it from inside a loop with a
//! per-item discriminator creates one binding per item.
//!
//! # Misuse
//!
//! The `try_` variants return a [`HookError`]. The plain variants panic with
//! the same message, since calling a hook outside a frame is a bug in the
//! calling code rather than a condition to recover from.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::panic::Location;

use crate::config::RuntimeConfig;
use crate::error::HookError;
use crate::key::{DiscriminatorKey, HookKey};

// ============================================================================
// Hook Registry
// ============================================================================

/// Metadata about a hook binding for debugging purposes.
#[derive(Debug, Clone)]
pub struct HookMeta {
    /// The hook function name (e.g., "use_event", "use_hook_state")
    pub hook_type: &'static str,
    /// The type of value stored (from std::any::type_name)
    pub value_type: &'static str,
    /// The type of the discriminator
    pub discriminator_type: &'static str,
    /// Where the hook was called
    pub location: &'static Location<'static>,
    /// Last frame in which the binding was touched
    pub last_frame: u64,
}

/// Internal storage for a single binding.
struct HookEntry {
    value: Box<dyn Any>,
    cleanup: Option<Box<dyn FnOnce()>>,
    meta: HookMeta,
}

/// Cleanups detached from the registry, run after its borrow is released.
type Cleanups = Vec<Box<dyn FnOnce()>>;

/// Outcome of one [`end_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    /// The frame that ended.
    pub frame: u64,
    /// Bindings still alive after teardown.
    pub live_hooks: usize,
    /// Bindings torn down because the frame did not touch them.
    pub torn_down: usize,
}

/// Registry that owns hook state across frames.
///
/// Entries live in an arena (`Vec<Option<_>>` plus a free list) and are found
/// through a key table. The registry never runs user code while it is
/// borrowed: state initializers run before insertion and cleanups are handed
/// back to the caller to run afterwards.
pub struct HookRegistry {
    /// Binding storage; `None` slots are free
    entries: Vec<Option<HookEntry>>,
    /// Indices of free slots in `entries`
    free: Vec<usize>,
    /// Key to slot index
    lookup: HashMap<HookKey, usize>,
    /// Frame currently in progress
    frame: Option<u64>,
    /// Number of frames started so far
    frame_count: u64,
    config: RuntimeConfig,
}

impl HookRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new empty registry with the given configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            lookup: HashMap::new(),
            frame: None,
            frame_count: 0,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Replace the configuration. Applies to bindings created afterwards.
    pub fn set_config(&mut self, config: RuntimeConfig) {
        self.config = config;
    }

    /// The frame in progress, if any.
    pub fn current_frame(&self) -> Option<u64> {
        self.frame
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether there are no live bindings.
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Start a new frame and return its number.
    fn begin_frame(&mut self) -> Result<u64, HookError> {
        if let Some(frame) = self.frame {
            return Err(HookError::FrameInProgress { frame });
        }

        let frame = self.frame_count;
        self.frame_count += 1;
        self.frame = Some(frame);
        tracing::trace!(frame, "frame started");
        Ok(frame)
    }

    /// End the frame in progress and detach every binding it did not touch.
    ///
    /// The returned cleanups must be run by the caller.
    fn end_frame(&mut self) -> Result<(FrameSummary, Cleanups), HookError> {
        let frame = self.frame.take().ok_or(HookError::NoFrameInProgress)?;

        let cleanups = if self.config.teardown_unused {
            self.detach_where(|meta| meta.last_frame != frame)
        } else {
            Vec::new()
        };

        let summary = FrameSummary {
            frame,
            live_hooks: self.lookup.len(),
            torn_down: cleanups.len(),
        };
        tracing::trace!(
            frame,
            live = summary.live_hooks,
            torn_down = summary.torn_down,
            "frame ended"
        );
        Ok((summary, cleanups))
    }

    /// Look up the state stored for `key`, marking it as touched this frame.
    fn get<T: Clone + 'static>(
        &mut self,
        hook_type: &'static str,
        key: &HookKey,
    ) -> Result<Option<T>, HookError> {
        let frame = self.frame.ok_or(HookError::OutsideFrame { hook: hook_type })?;

        let Some(&index) = self.lookup.get(key) else {
            return Ok(None);
        };
        let Some(Some(entry)) = self.entries.get_mut(index) else {
            return Ok(None);
        };

        entry.meta.last_frame = frame;
        match entry.value.downcast_ref::<T>() {
            Some(value) => Ok(Some(value.clone())),
            None => Err(HookError::StateTypeMismatch {
                hook: hook_type,
                location: key.location,
                expected: entry.meta.value_type,
                found: std::any::type_name::<T>(),
            }),
        }
    }

    /// Store a new binding for `key`.
    fn insert<T: Clone + 'static>(
        &mut self,
        hook_type: &'static str,
        key: HookKey,
        value: T,
        cleanup: Box<dyn FnOnce()>,
    ) -> Result<(), HookError> {
        let frame = self.frame.ok_or(HookError::OutsideFrame { hook: hook_type })?;

        let meta = HookMeta {
            hook_type,
            value_type: std::any::type_name::<T>(),
            discriminator_type: key.discriminator.type_name(),
            location: key.location,
            last_frame: frame,
        };
        tracing::debug!(
            hook = hook_type,
            location = %key.location,
            discriminator = meta.discriminator_type,
            "hook binding created"
        );

        let entry = HookEntry {
            value: Box::new(value),
            cleanup: Some(cleanup),
            meta,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.entries[index] = Some(entry);
                index
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        };
        self.lookup.insert(key, index);
        Ok(())
    }

    /// Remove every entry whose metadata matches `predicate`.
    fn detach_where(&mut self, mut predicate: impl FnMut(&HookMeta) -> bool) -> Cleanups {
        let entries = &mut self.entries;
        let free = &mut self.free;
        let mut cleanups = Vec::new();

        self.lookup.retain(|_, index| {
            let Some(slot) = entries.get_mut(*index) else {
                return false;
            };
            let detach = slot.as_ref().is_none_or(|entry| predicate(&entry.meta));
            if detach {
                if let Some(mut entry) = slot.take() {
                    tracing::debug!(
                        hook = entry.meta.hook_type,
                        location = %entry.meta.location,
                        last_frame = entry.meta.last_frame,
                        "hook binding torn down"
                    );
                    if let Some(cleanup) = entry.cleanup.take() {
                        cleanups.push(cleanup);
                    }
                }
                free.push(*index);
            }
            !detach
        });

        cleanups
    }

    /// Remove the binding stored for `key`, returning its cleanup.
    fn detach_key(&mut self, key: &HookKey) -> Option<Box<dyn FnOnce()>> {
        let index = self.lookup.remove(key)?;
        let entry = self.entries.get_mut(index)?.take()?;
        self.free.push(index);
        entry.cleanup
    }

    /// Detach all bindings and reset the frame counter (for app restart).
    fn clear(&mut self) -> Cleanups {
        let cleanups = self.detach_where(|_| true);
        self.entries.clear();
        self.free.clear();
        self.frame = None;
        self.frame_count = 0;
        cleanups
    }

    /// Metadata of every live binding.
    pub fn debug_info(&self) -> Vec<HookMeta> {
        self.entries
            .iter()
            .flatten()
            .map(|entry| entry.meta.clone())
            .collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("live", &self.lookup.len())
            .field("frame", &self.frame)
            .field("frame_count", &self.frame_count)
            .field("config", &self.config)
            .finish()
    }
}

// Thread-local hook registry
thread_local! {
    static HOOK_REGISTRY: RefCell<HookRegistry> = RefCell::new(HookRegistry::new());
}

fn run_cleanups(cleanups: Cleanups) {
    for cleanup in cleanups {
        cleanup();
    }
}

// ============================================================================
// Public API - Lifecycle functions
// ============================================================================

/// Begin a frame. Returns the frame number, starting at 0.
pub fn begin_frame() -> Result<u64, HookError> {
    HOOK_REGISTRY.with(|registry| registry.borrow_mut().begin_frame())
}

/// End the frame in progress.
///
/// Bindings the frame did not touch are torn down: their cleanup runs (for
/// [`use_event`](crate::use_event), the subscription is disposed).
pub fn end_frame() -> Result<FrameSummary, HookError> {
    let (summary, cleanups) = HOOK_REGISTRY.with(|registry| registry.borrow_mut().end_frame())?;
    run_cleanups(cleanups);
    Ok(summary)
}

/// The frame in progress on this thread, if any.
pub fn current_frame() -> Option<u64> {
    HOOK_REGISTRY.with(|registry| registry.borrow().current_frame())
}

/// Whether a frame is in progress on this thread.
pub fn is_in_frame() -> bool {
    current_frame().is_some()
}

/// Tear down every binding and reset the frame counter.
///
/// The configuration is kept.
pub fn clear_hooks() {
    let cleanups = HOOK_REGISTRY.with(|registry| registry.borrow_mut().clear());
    run_cleanups(cleanups);
}

/// Replace this thread's runtime configuration.
pub fn configure(config: RuntimeConfig) {
    HOOK_REGISTRY.with(|registry| registry.borrow_mut().set_config(config));
}

/// This thread's runtime configuration.
pub fn runtime_config() -> RuntimeConfig {
    HOOK_REGISTRY.with(|registry| registry.borrow().config().clone())
}

/// Get debug information about live bindings.
///
/// Useful for devtools inspection.
pub fn hooks_debug_info() -> Vec<HookMeta> {
    HOOK_REGISTRY.with(|registry| registry.borrow().debug_info())
}

// ============================================================================
// Public API - Hook functions
// ============================================================================

/// What [`hook_state_at`] does when the binding holds state of another type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnTypeChange {
    /// Report [`HookError::StateTypeMismatch`].
    Error,
    /// Tear the old binding down (running its cleanup) and start a new one.
    Replace,
}

/// Get or create the state for `key`.
///
/// `init` runs only when the binding does not exist yet, outside any
/// registry borrow, so it may itself call hooks. Cleanups of replaced
/// bindings also run outside the borrow.
pub(crate) fn hook_state_at<T: Clone + 'static>(
    hook_type: &'static str,
    key: HookKey,
    init: impl FnOnce() -> T,
    cleanup: impl FnOnce(T) + 'static,
    on_type_change: OnTypeChange,
) -> Result<T, HookError> {
    let existing = HOOK_REGISTRY.with(|registry| registry.borrow_mut().get::<T>(hook_type, &key));
    match existing {
        Ok(Some(value)) => return Ok(value),
        Ok(None) => {}
        Err(HookError::StateTypeMismatch {
            expected, found, ..
        }) if on_type_change == OnTypeChange::Replace => {
            tracing::debug!(
                hook = hook_type,
                location = %key.location,
                expected,
                found,
                "hook state type changed, replacing binding"
            );
            let stale = HOOK_REGISTRY.with(|registry| registry.borrow_mut().detach_key(&key));
            if let Some(stale) = stale {
                stale();
            }
        }
        Err(err) => return Err(err),
    }

    let value = init();
    let for_cleanup = value.clone();
    HOOK_REGISTRY.with(|registry| {
        registry.borrow_mut().insert(
            hook_type,
            key,
            value.clone(),
            Box::new(move || cleanup(for_cleanup)),
        )
    })?;
    Ok(value)
}

/// Get or create persistent state keyed by this call site and `discriminator`.
///
/// `cleanup` receives the state when the binding is torn down. Use shared
/// handles (`Rc<Cell<_>>`, `Rc<RefCell<_>>`) for state that should be
/// mutated across frames.
///
/// # Errors
///
/// [`HookError::OutsideFrame`] when no frame is in progress;
/// [`HookError::StateTypeMismatch`] when the binding holds another type.
#[track_caller]
pub fn try_use_hook_state<D, T>(
    discriminator: D,
    init: impl FnOnce() -> T,
    cleanup: impl FnOnce(T) + 'static,
) -> Result<T, HookError>
where
    D: Hash + Eq + 'static,
    T: Clone + 'static,
{
    let key = HookKey::new(Location::caller(), DiscriminatorKey::new(discriminator));
    hook_state_at("use_hook_state", key, init, cleanup, OnTypeChange::Error)
}

/// Like [`try_use_hook_state`], but panics on misuse.
#[track_caller]
pub fn use_hook_state<D, T>(
    discriminator: D,
    init: impl FnOnce() -> T,
    cleanup: impl FnOnce(T) + 'static,
) -> T
where
    D: Hash + Eq + 'static,
    T: Clone + 'static,
{
    try_use_hook_state(discriminator, init, cleanup)
        .unwrap_or_else(|err| panic!("framehook hooks error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn reset_registry() {
        clear_hooks();
        configure(RuntimeConfig::default());
    }

    fn counter(discriminator: &'static str, cleanups: &Rc<Cell<u32>>) -> Rc<Cell<u32>> {
        let cleanups = Rc::clone(cleanups);
        use_hook_state(
            discriminator,
            || Rc::new(Cell::new(0)),
            move |_| cleanups.set(cleanups.get() + 1),
        )
    }

    #[test]
    fn state_persists_across_frames() {
        reset_registry();
        let cleanups = Rc::new(Cell::new(0));

        begin_frame().unwrap();
        counter("a", &cleanups).set(41);
        end_frame().unwrap();

        begin_frame().unwrap();
        let state = counter("a", &cleanups);
        assert_eq!(state.get(), 41);
        end_frame().unwrap();

        assert_eq!(cleanups.get(), 0);
    }

    #[test]
    fn discriminators_are_independent() {
        reset_registry();
        let cleanups = Rc::new(Cell::new(0));

        begin_frame().unwrap();
        counter("a", &cleanups).set(1);
        counter("b", &cleanups).set(2);
        assert_eq!(counter("a", &cleanups).get(), 1);
        assert_eq!(counter("b", &cleanups).get(), 2);
        end_frame().unwrap();
    }

    #[test]
    fn untouched_bindings_are_torn_down() {
        reset_registry();
        let cleanups = Rc::new(Cell::new(0));

        begin_frame().unwrap();
        counter("a", &cleanups);
        counter("b", &cleanups);
        end_frame().unwrap();

        begin_frame().unwrap();
        counter("a", &cleanups);
        let summary = end_frame().unwrap();

        assert_eq!(summary.torn_down, 1);
        assert_eq!(summary.live_hooks, 1);
        assert_eq!(cleanups.get(), 1);

        // A torn-down binding starts fresh when used again.
        begin_frame().unwrap();
        assert_eq!(counter("b", &cleanups).get(), 0);
        end_frame().unwrap();
    }

    #[test]
    fn teardown_can_be_disabled() {
        reset_registry();
        configure(RuntimeConfig::default().with_teardown_unused(false));
        let cleanups = Rc::new(Cell::new(0));

        begin_frame().unwrap();
        counter("a", &cleanups).set(5);
        end_frame().unwrap();

        begin_frame().unwrap();
        let summary = end_frame().unwrap();
        assert_eq!(summary.torn_down, 0);

        begin_frame().unwrap();
        assert_eq!(counter("a", &cleanups).get(), 5);
        end_frame().unwrap();

        clear_hooks();
        assert_eq!(cleanups.get(), 1);
        configure(RuntimeConfig::default());
    }

    #[test]
    fn frame_numbers_increase() {
        reset_registry();

        assert_eq!(current_frame(), None);
        assert!(!is_in_frame());
        assert_eq!(begin_frame(), Ok(0));
        assert_eq!(current_frame(), Some(0));
        assert!(is_in_frame());
        assert_eq!(end_frame().unwrap().frame, 0);
        assert_eq!(begin_frame(), Ok(1));
        end_frame().unwrap();
    }

    #[test]
    fn nested_begin_is_rejected() {
        reset_registry();

        begin_frame().unwrap();
        assert_eq!(begin_frame(), Err(HookError::FrameInProgress { frame: 0 }));
        end_frame().unwrap();
        assert_eq!(end_frame(), Err(HookError::NoFrameInProgress));
    }

    #[test]
    fn hook_outside_frame_is_an_error() {
        reset_registry();

        let result = try_use_hook_state("a", || 0u32, |_| {});
        assert_eq!(result, Err(HookError::OutsideFrame { hook: "use_hook_state" }));
    }

    #[test]
    #[should_panic(expected = "outside of a frame")]
    fn hook_outside_frame_panics() {
        reset_registry();
        let _ = use_hook_state("a", || 0u32, |_| {});
    }

    #[test]
    fn same_key_with_another_type_is_an_error() {
        reset_registry();

        fn state<T: Clone + 'static>(init: T) -> Result<T, HookError> {
            try_use_hook_state("shared", move || init, |_| {})
        }

        begin_frame().unwrap();
        assert_eq!(state(1u32), Ok(1));
        let err = state("text").unwrap_err();
        assert_eq!(err.as_label(), "hook_state_type_mismatch");
        end_frame().unwrap();
    }

    #[test]
    fn replace_on_type_change_runs_the_old_cleanup() {
        reset_registry();
        let cleanups = Rc::new(Cell::new(0));

        fn state<T: Clone + 'static>(init: T, cleanups: &Rc<Cell<u32>>) -> Result<T, HookError> {
            let cleanups = Rc::clone(cleanups);
            let key = HookKey::new(Location::caller(), DiscriminatorKey::new("shared"));
            hook_state_at(
                "test_hook",
                key,
                move || init,
                move |_| cleanups.set(cleanups.get() + 1),
                OnTypeChange::Replace,
            )
        }

        begin_frame().unwrap();
        assert_eq!(state(1u32, &cleanups), Ok(1));
        assert_eq!(state("text", &cleanups), Ok("text"));
        assert_eq!(cleanups.get(), 1);
        assert_eq!(state("other", &cleanups), Ok("text"));
        end_frame().unwrap();

        assert_eq!(hooks_debug_info().len(), 1);
        assert_eq!(hooks_debug_info()[0].value_type, std::any::type_name::<&str>());
    }

    #[test]
    fn init_may_call_hooks() {
        reset_registry();

        begin_frame().unwrap();
        let outer = use_hook_state(
            "outer",
            || use_hook_state("inner", || 7u32, |_| {}) + 1,
            |_| {},
        );
        assert_eq!(outer, 8);
        assert_eq!(hooks_debug_info().len(), 2);
        end_frame().unwrap();
    }

    #[test]
    fn debug_info_describes_bindings() {
        reset_registry();

        begin_frame().unwrap();
        let _ = use_hook_state(3u8, || 0u64, |_| {});
        let info = hooks_debug_info();
        end_frame().unwrap();

        assert_eq!(info.len(), 1);
        assert_eq!(info[0].hook_type, "use_hook_state");
        assert_eq!(info[0].value_type, "u64");
        assert_eq!(info[0].discriminator_type, "u8");
        assert_eq!(info[0].location.file(), file!());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut registry = HookRegistry::new();
        let here = Location::caller();

        registry.begin_frame().unwrap();
        registry
            .insert("t", HookKey::new(here, DiscriminatorKey::new(1)), 1u8, Box::new(|| {}))
            .unwrap();
        let (_, cleanups) = registry.end_frame().unwrap();
        assert!(cleanups.is_empty());

        registry.begin_frame().unwrap();
        let (summary, cleanups) = registry.end_frame().unwrap();
        assert_eq!(summary.torn_down, 1);
        run_cleanups(cleanups);
        assert!(registry.is_empty());

        registry.begin_frame().unwrap();
        registry
            .insert("t", HookKey::new(here, DiscriminatorKey::new(2)), 2u8, Box::new(|| {}))
            .unwrap();
        assert_eq!(registry.entries.len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
