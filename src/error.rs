// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in the shell return `error::Result<T>`.  Every
// failure is terminal for the `run_loop` call that produced it; there are no
// retries.  Errors reach the caller through the loop's result channel.

use crate::window::WindowHandle;

/// Every error that the shell can produce.
#[derive(Debug)]
pub enum GuiError {
    /// A Win32 API call returned a failure code.
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (config file read or write).
    Io(std::io::Error),

    /// The configuration file is not valid JSON for `Config`.
    Config(serde_json::Error),

    /// The configuration file was written by an incompatible version.
    ConfigVersion { found: u32, expected: u32 },

    /// A requested window size is zero or negative.
    InvalidSize { width: i32, height: i32 },

    /// The diagnostic logger could not be installed.
    Logging(String),

    /// `run_loop` was called before `init` registered the window class.
    NotInitialized,

    /// `init` was called twice on the same `Application`.
    AlreadyInitialized,

    /// A message was posted to a window that does not exist (anymore).
    InvalidWindow(WindowHandle),

    /// The loop received a quit message carrying a non-zero exit code.
    AbnormalQuit { exit_code: usize },

    /// The thread's message queue was torn down while the loop was running.
    QueueClosed,

    /// A renderer callback failed.
    Renderer(Box<dyn std::error::Error + Send + Sync>),

    /// The loop worker went away without reporting a result.
    WorkerExited,
}

impl GuiError {
    /// Wrap an arbitrary renderer failure.
    pub fn renderer<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Renderer(err.into())
    }

    /// Tag a windows-crate error with the function that produced it.
    #[cfg(windows)]
    pub(crate) fn windows(function: &'static str, err: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function,
            code: err.code().0 as u32,
        }
    }
}

impl std::fmt::Display for GuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win32 { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::ConfigVersion { found, expected } => {
                write!(f, "unsupported configuration version {found} (expected {expected})")
            }
            Self::InvalidSize { width, height } => {
                write!(f, "invalid window size {width}x{height}")
            }
            Self::Logging(msg) => write!(f, "cannot install logger: {msg}"),
            Self::NotInitialized => f.write_str("application is not initialised"),
            Self::AlreadyInitialized => f.write_str("window class is already registered"),
            Self::InvalidWindow(window) => write!(f, "invalid window handle {window}"),
            Self::AbnormalQuit { exit_code } => {
                write!(f, "message loop quit with exit code {exit_code}")
            }
            Self::QueueClosed => f.write_str("message queue closed"),
            Self::Renderer(e) => write!(f, "renderer error: {e}"),
            Self::WorkerExited => f.write_str("message loop worker exited without a result"),
        }
    }
}

impl std::error::Error for GuiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Renderer(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GuiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for GuiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GuiError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn win32_display_includes_function_and_hex_code() {
        let e = GuiError::Win32 {
            function: "RegisterClassExW",
            code: 1410,
        };
        assert_eq!(e.to_string(), "RegisterClassExW failed (error 0x00000582)");
    }

    #[cfg(windows)]
    #[test]
    fn windows_error_is_tagged_with_the_failing_function() {
        let hr = windows::core::HRESULT(0x8000_4005_u32 as i32);
        let e = GuiError::windows("D2D1CreateFactory", windows::core::Error::from(hr));
        assert_eq!(e.to_string(), "D2D1CreateFactory failed (error 0x80004005)");
    }

    #[test]
    fn abnormal_quit_encodes_exit_code() {
        let e = GuiError::AbnormalQuit { exit_code: 42 };
        assert!(e.to_string().contains("42"));
    }

    #[test]
    fn renderer_error_keeps_source() {
        let e = GuiError::renderer("device lost");
        assert_eq!(e.to_string(), "renderer error: device lost");
        assert!(e.source().is_some());
    }

    #[test]
    fn io_error_converts_with_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = GuiError::from(io);
        assert!(matches!(e, GuiError::Io(_)));
        assert!(e.source().is_some());
    }

    #[test]
    fn invalid_window_shows_handle() {
        let e = GuiError::InvalidWindow(WindowHandle::from_raw(0x2a));
        assert_eq!(e.to_string(), "invalid window handle 0x2a");
    }
}
