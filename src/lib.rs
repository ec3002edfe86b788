// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! A minimal native application shell.
//!
//! An [`Application`] registers one window class, then each
//! [`Application::run_loop`] call opens one window on a dedicated thread and
//! pumps its messages, forwarding resize and paint to an optional
//! [`Renderer`].  On Windows this is plain Win32; other targets get a
//! headless in-process backend with the same message semantics.
//!
//! ```no_run
//! let mut app = gui_shell::Application::new();
//! app.init()?;
//! let done = app.run_loop("hello", 640, 480, None);
//! done.recv().expect("loop reports once")?;
//! # Ok::<(), gui_shell::GuiError>(())
//! ```

mod app;
pub mod config;
mod dispatch;
pub mod dpi;
mod error;
mod event_loop;
pub mod logging;
mod platform;
mod registry;
mod renderer;
mod window;

#[cfg(test)]
mod testing;

pub use app::Application;
pub use error::{GuiError, Result};
pub use platform::native::{show_error_dialog, DrawingFactory};
pub use renderer::Renderer;
pub use window::{WindowHandle, WindowMessage};
