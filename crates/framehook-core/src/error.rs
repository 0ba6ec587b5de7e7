//! Errors raised by the hook runtime.
//!
//! Event absence is never an error: a source that never fires simply yields
//! an empty [`Events`](crate::Events) iterator. The variants here all describe
//! misuse of the frame lifecycle or of hook keys.

use std::panic::Location;

use thiserror::Error;

/// Errors produced by the hook registry and the hooks built on it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// A hook was called while no frame was in progress.
    #[error("`{hook}` called outside of a frame; call `begin_frame` first")]
    OutsideFrame {
        /// Name of the hook that was called.
        hook: &'static str,
    },

    /// `begin_frame` was called while a frame was already in progress.
    #[error("frame {frame} is still in progress; call `end_frame` before starting another")]
    FrameInProgress {
        /// The frame that is still open.
        frame: u64,
    },

    /// `end_frame` was called without a matching `begin_frame`.
    #[error("no frame in progress")]
    NoFrameInProgress,

    /// The same call site and discriminator were used with a different state type.
    #[error("`{hook}` at {location} previously stored `{expected}`, now asked for `{found}`")]
    StateTypeMismatch {
        /// Name of the hook that was called.
        hook: &'static str,
        /// Call site of the hook.
        location: &'static Location<'static>,
        /// Type stored by the first call.
        expected: &'static str,
        /// Type requested by this call.
        found: &'static str,
    },
}

impl HookError {
    /// Returns a short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HookError::OutsideFrame { .. } => "hook_outside_frame",
            HookError::FrameInProgress { .. } => "frame_in_progress",
            HookError::NoFrameInProgress => "no_frame_in_progress",
            HookError::StateTypeMismatch { .. } => "hook_state_type_mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            HookError::OutsideFrame { hook: "use_event" }.as_label(),
            "hook_outside_frame"
        );
        assert_eq!(HookError::NoFrameInProgress.as_label(), "no_frame_in_progress");
    }

    #[test]
    fn messages_name_the_hook() {
        let err = HookError::OutsideFrame { hook: "use_event" };
        assert!(err.to_string().contains("`use_event` called outside of a frame"));

        let err = HookError::FrameInProgress { frame: 3 };
        assert!(err.to_string().contains("frame 3"));
    }
}
