// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module in the crate where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

mod direct2d; // Direct2D factory owned by the Application
mod dpi; // process DPI awareness
mod window; // window class, WndProc, message loop

pub use direct2d::DrawingFactory;
pub(crate) use direct2d::create_drawing_factory;
pub use window::show_error_dialog;
pub(crate) use window::{
    create_window, post_message, register_class, show_window, MessageQueue, WindowClass,
};
