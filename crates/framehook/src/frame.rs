//! Running one frame of per-frame code.

use framehook_core::hooks::{begin_frame, end_frame};
use framehook_core::HookError;

/// Ends the frame if the frame body unwinds.
struct FrameGuard {
    open: bool,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.open {
            tracing::warn!("frame body panicked, ending the frame");
            if let Err(err) = end_frame() {
                tracing::warn!("failed to end the frame after a panic: {}", err);
            }
        }
    }
}

/// Run `frame` between [`begin_frame`] and [`end_frame`] and return its
/// result.
///
/// Hooks called by `frame` (including [`use_event`](crate::use_event)) see
/// the new frame; bindings it did not touch are torn down afterwards.
///
/// # Errors
///
/// Returns [`HookError::FrameInProgress`] when called from inside another
/// frame on the same thread.
///
/// # Example
///
/// ```
/// use framehook::prelude::*;
///
/// let key_pressed = Signal::<(String,)>::new();
///
/// for _ in 0..2 {
///     let keys: Vec<String> = run_frame(|| {
///         use_event("keys", &key_pressed)
///             .map(|(_, (key,))| key)
///             .collect()
///     })
///     .unwrap();
///
///     // Nothing fires, so every frame reads an empty buffer.
///     assert!(keys.is_empty());
/// }
/// ```
pub fn run_frame<R>(frame: impl FnOnce() -> R) -> Result<R, HookError> {
    begin_frame()?;
    let mut guard = FrameGuard { open: true };

    let output = frame();

    guard.open = false;
    end_frame()?;

    Ok(output)
}
