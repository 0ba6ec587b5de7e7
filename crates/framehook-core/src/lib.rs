//! Core types and traits for framehook.
//!
//! Per-frame code (immediate-mode UI, ECS systems) calls hooks every frame;
//! the hook registry keeps their state between frames. The central hook is
//! [`use_event`], which yields the events a source fired since the last
//! frame.

pub mod config;
pub mod connection;
pub mod error;
pub mod hooks;
pub mod instance;
pub mod key;
pub mod signal;
pub mod source;
pub mod use_event;

pub use config::RuntimeConfig;
pub use error::HookError;

// Re-export the frame lifecycle and generic hook state
pub use hooks::{
    begin_frame, clear_hooks, configure, current_frame, end_frame, hooks_debug_info, is_in_frame,
    runtime_config, try_use_hook_state, use_hook_state, FrameSummary, HookMeta, HookRegistry,
};

// Re-export event sources and the event query
pub use connection::{ConnectionLike, Destroy, Disconnect};
pub use instance::{Instance, InstanceEvent, InstanceId};
pub use key::{DiscriminatorKey, HookKey};
pub use signal::{Connection, Signal};
pub use source::{AsSignalLike, Callback, Connect, On, SignalLike};
pub use use_event::{try_use_event, use_event, EventBinding, EventRecord, EventSource, Events};
