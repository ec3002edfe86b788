// ── Window identity and messages ──────────────────────────────────────────────
//
// Pure Rust: no OS calls.  Both platform backends decode raw
// (message, wparam, lparam) triples through `WindowMessage::decode` so the
// dispatch table sees the same values everywhere.

use std::fmt;

// ── Message identifiers (winuser.h) ───────────────────────────────────────────

pub(crate) const WM_CREATE: u32 = 0x0001;
pub(crate) const WM_DESTROY: u32 = 0x0002;
pub(crate) const WM_SIZE: u32 = 0x0005;
pub(crate) const WM_PAINT: u32 = 0x000F;
pub(crate) const WM_CLOSE: u32 = 0x0010;
pub(crate) const WM_QUIT: u32 = 0x0012;
pub(crate) const WM_DISPLAYCHANGE: u32 = 0x007E;

/// Low 16 bits of a message parameter.
pub(crate) fn loword(value: isize) -> u16 {
    (value & 0xFFFF) as u16
}

/// Bits 16..32 of a message parameter.
pub(crate) fn hiword(value: isize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

// ── WindowHandle ──────────────────────────────────────────────────────────────

/// Opaque identifier of a native window.
///
/// On Windows this is the `HWND` value; the headless backend hands out
/// process-unique numbers.  It is only an identifier: holding one does not
/// keep the window alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(isize);

impl WindowHandle {
    /// Wrap a raw native handle value.
    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    /// The raw native handle value, e.g. for passing to a graphics API.
    pub const fn raw(self) -> isize {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ── WindowMessage ─────────────────────────────────────────────────────────────

/// The window messages the shell distinguishes.
///
/// Everything else travels as `Other` and goes to default processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMessage {
    /// `WM_CREATE`: the window exists but is not yet visible.
    Create,
    /// `WM_SIZE`: new client-area size in pixels.
    Size { width: u32, height: u32 },
    /// `WM_DISPLAYCHANGE`: display resolution changed.
    DisplayChange,
    /// `WM_PAINT`: the window has an invalid region.
    Paint,
    /// `WM_CLOSE`: the user asked to close the window.
    Close,
    /// `WM_DESTROY`: the window is being destroyed.
    Destroy,
    /// `WM_QUIT`: ends the thread's message loop.
    Quit { exit_code: usize },
    /// Any message not listed above.
    Other { id: u32, wparam: usize, lparam: isize },
}

impl WindowMessage {
    /// Decode a raw message triple.
    pub(crate) fn decode(id: u32, wparam: usize, lparam: isize) -> Self {
        match id {
            WM_CREATE => Self::Create,
            WM_SIZE => Self::Size {
                width: u32::from(loword(lparam)),
                height: u32::from(hiword(lparam)),
            },
            WM_DISPLAYCHANGE => Self::DisplayChange,
            WM_PAINT => Self::Paint,
            WM_CLOSE => Self::Close,
            WM_DESTROY => Self::Destroy,
            WM_QUIT => Self::Quit { exit_code: wparam },
            _ => Self::Other { id, wparam, lparam },
        }
    }

    /// Encode back into a raw triple suitable for posting.
    ///
    /// Sizes are truncated to 16 bits per dimension, as `WM_SIZE` does.
    pub(crate) fn encode(self) -> (u32, usize, isize) {
        match self {
            Self::Create => (WM_CREATE, 0, 0),
            Self::Size { width, height } => {
                let lparam = ((height as isize & 0xFFFF) << 16) | (width as isize & 0xFFFF);
                (WM_SIZE, 0, lparam)
            }
            Self::DisplayChange => (WM_DISPLAYCHANGE, 0, 0),
            Self::Paint => (WM_PAINT, 0, 0),
            Self::Close => (WM_CLOSE, 0, 0),
            Self::Destroy => (WM_DESTROY, 0, 0),
            Self::Quit { exit_code } => (WM_QUIT, exit_code, 0),
            Self::Other { id, wparam, lparam } => (id, wparam, lparam),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
