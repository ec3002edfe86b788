#![allow(unsafe_code)]

use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};

/// Opt into Per-Monitor v2 DPI awareness.
///
/// Window sizes are scaled by the renderer's DPI before creation, so the
/// process must not also be bitmap-stretched by the system.  MUST be called
/// before any window is created.  Fails harmlessly when awareness was already
/// set (manifest or an earlier call).
pub(crate) fn init() {
    // SAFETY: No pointers involved; only affects process-wide DPI mode.
    if let Err(e) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        tracing::debug!(error = %e, "DPI awareness unchanged");
    }
}
