//! framehook - per-frame event queries for immediate-mode and ECS-style code.
//!
//! Code that runs once per frame (an immediate-mode UI, an ECS system) cannot
//! hold on to callback subscriptions across frames. framehook keeps those
//! subscriptions in a hook table keyed by call site, buffers every event a
//! source fires between frames, and hands the buffered events back as an
//! iterator the next time the same line asks for them.
//!
//! # Quick Start
//!
//! ```
//! use framehook::prelude::*;
//!
//! let key_pressed = Signal::<(String,)>::new();
//!
//! fn key_handler(key_pressed: &Signal<(String,)>) -> Vec<String> {
//!     use_event("keys", key_pressed).map(|(_, (key,))| key).collect()
//! }
//!
//! // Frame 1 subscribes.
//! assert!(run_frame(|| key_handler(&key_pressed)).unwrap().is_empty());
//!
//! key_pressed.fire(("A".into(),));
//! key_pressed.fire(("B".into(),));
//!
//! // Frame 2 sees both events, in order.
//! assert_eq!(run_frame(|| key_handler(&key_pressed)).unwrap(), ["A", "B"]);
//! ```
//!
//! # Owner Events
//!
//! `#[derive(Instance)]` turns signal fields into statically checked event
//! names:
//!
//! ```
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
//! let part = Part { id: InstanceId::new(), touched: Signal::new() };
//!
//! let touched_by = |part: &Part| -> Vec<(usize, String)> {
//!     use_event(part, Part::Touched).map(|(i, (who,))| (i, who)).collect()
//! };
//!
//! run_frame(|| touched_by(&part)).unwrap();
//! part.touched.fire(("Alice".into(),));
//! assert_eq!(run_frame(|| touched_by(&part)).unwrap(), [(0, "Alice".to_string())]);
//! ```
//!
//! # Compile-time checks
//!
//! Asking an owner for an event it does not declare does not compile:
//!
//! ```compile_fail,E0599
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
//! let part = Part { id: InstanceId::new(), touched: Signal::new() };
//! run_frame(|| use_event(&part, Part::Clicked).count()).unwrap();
//! ```
//!
//! Neither does passing a value that is not an event source:
//!
//! ```compile_fail,E0277
//! use framehook::prelude::*;
//!
//! struct NotASource;
//!
//! run_frame(|| use_event("keys", NotASource).count()).unwrap();
//! ```
//!
//! `#[derive(Instance)]` rejects malformed owners. An unknown key in
//! `#[event(...)]` (the error suggests `name`):
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     #[instance_id]
//!     id: InstanceId,
//!     #[event(nmae = "Touched")]
//!     touched: Signal<(String,)>,
//! }
//! ```
//!
//! Two events with the same name:
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     #[instance_id]
//!     id: InstanceId,
//!     #[event]
//!     touched: Signal<(String,)>,
//!     #[event(name = "Touched")]
//!     touched_again: Signal<(String,)>,
//! }
//! ```
//!
//! An event name that is not an identifier:
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     #[instance_id]
//!     id: InstanceId,
//!     #[event(name = "was touched")]
//!     touched: Signal<(String,)>,
//! }
//! ```
//!
//! No `#[instance_id]` field (the error suggests marking `id`):
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     id: InstanceId,
//!     #[event]
//!     touched: Signal<(String,)>,
//! }
//! ```
//!
//! Two `#[instance_id]` fields:
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! struct Part {
//!     #[instance_id]
//!     id: InstanceId,
//!     #[instance_id]
//!     other_id: InstanceId,
//! }
//! ```
//!
//! Anything but a struct with named fields:
//!
//! ```compile_fail
//! use framehook::prelude::*;
//!
//! #[derive(Instance)]
//! enum Part {
//!     Door,
//! }
//! ```
//!
//! # Rules of Hooks
//!
//! Bindings are keyed by **call site and discriminator**:
//!
//! - The same line with the same discriminator reads the same buffer every frame
//! - Two different lines never share a buffer, even for the same source
//! - Call hooks only between `begin_frame` and `end_frame` (or inside [`run_frame`])
//! - A binding not queried during a frame is torn down when the frame ends
//!
//! See [`framehook_core::hooks`] and [`framehook_core::use_event`] for details.

pub mod frame;
pub mod logging;

pub mod prelude {
    //! Common imports for framehook users.
    pub use crate::frame::run_frame;
    pub use framehook_core::{
        use_event, use_hook_state, AsSignalLike, ConnectionLike, Instance, InstanceEvent,
        InstanceId, Signal, SignalLike,
    };
    pub use framehook_macros::Instance;
}

// Re-export core types at crate root
pub use framehook_core::{
    begin_frame, clear_hooks, configure, current_frame, end_frame, hooks_debug_info, is_in_frame,
    runtime_config, try_use_event, try_use_hook_state, use_event, use_hook_state, AsSignalLike,
    Callback, Connect, Connection, ConnectionLike, Destroy, Disconnect, EventRecord, EventSource,
    Events, FrameSummary, HookError, HookMeta, Instance, InstanceEvent, InstanceId, On,
    RuntimeConfig, Signal, SignalLike,
};
pub use framehook_macros::Instance;
pub use frame::run_frame;
pub use logging::init_tracing;

pub use framehook_core as core;
