// ── Platform abstraction layer ────────────────────────────────────────────────
//
// Exactly one backend is compiled in and re-exported as `native`:
//   • `win32`    – the real thing, on Windows targets.
//   • `headless` – an in-process simulation of windows and message queues
//                  for every other target.
//
// Both expose the same free functions and types: `WindowClass`,
// `register_class`, `DrawingFactory`, `create_drawing_factory`,
// `MessageQueue`, `create_window`, `show_window`, `post_message`,
// `show_error_dialog`.  No `unsafe` lives here; all Win32 FFI is confined to
// the `win32` sub-module and never leaks outward.

#[cfg(windows)]
pub(crate) mod win32;
#[cfg(windows)]
pub(crate) use win32 as native;

#[cfg(not(windows))]
pub(crate) mod headless;
#[cfg(not(windows))]
pub(crate) use headless as native;
