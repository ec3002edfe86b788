// ── Window class, window procedure, message loop ──────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the application's window class.
//   • Create, show and update top-level windows.
//   • Run the Win32 message loop (`MessageQueue`).
//   • Forward every message of the class to `dispatch::window_proc`.
//   • Expose a safe error-dialog helper for use by main().

#![allow(unsafe_code)]

use std::{
    cell::RefCell,
    ffi::c_void,
    sync::atomic::{AtomicU32, Ordering},
};

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{
            GetStockObject, InvalidateRect, UpdateWindow, ValidateRect, HBRUSH, WHITE_BRUSH,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
            LoadCursorW, LoadIconW, MessageBoxW, PostMessageW, PostQuitMessage, RegisterClassExW,
            ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, IDC_ARROW, IDI_APPLICATION,
            MB_ICONERROR, MB_OK, MSG, SHOW_WINDOW_CMD, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED,
            SW_SHOWNORMAL, WINDOW_EX_STYLE, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
        },
    },
};

use super::dpi;
use crate::{
    config::ShowState,
    dispatch::{self, Reply, WindowOps},
    error::{GuiError, Result},
    event_loop::{MessageSource, Retrieved},
    window::{WindowHandle, WindowMessage},
};

// ── Window class ──────────────────────────────────────────────────────────────

/// Prefix of the registered class name.  Each `Application` appends a serial
/// number so several instances can coexist in one process.
const CLASS_PREFIX: &str = "GuiShellWindow";

static CLASS_SERIAL: AtomicU32 = AtomicU32::new(0);

/// A registered window class: the module it belongs to and its atom.
///
/// Stored as plain integers so it can be handed to the loop thread.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowClass {
    instance: isize,
    atom: u16,
}

impl WindowClass {
    fn instance(&self) -> HINSTANCE {
        HINSTANCE(self.instance as *mut c_void)
    }

    /// The class atom in `MAKEINTATOM` form, usable wherever a class name is.
    fn name(&self) -> PCWSTR {
        PCWSTR(self.atom as usize as *const u16)
    }
}

pub(crate) fn register_class() -> Result<WindowClass> {
    // Sizes are scaled by the renderer's DPI; the system must not scale again.
    dpi::init();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime.
    let hmodule =
        unsafe { GetModuleHandleW(None) }.map_err(|e| GuiError::windows("GetModuleHandleW", e))?;
    let hinstance = HINSTANCE(hmodule.0);

    // SAFETY: LoadIconW with IDI_APPLICATION loads a built-in resource.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }
        .map_err(|e| GuiError::windows("LoadIconW", e))?;

    // SAFETY: LoadCursorW with IDC_ARROW loads a built-in resource.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }
        .map_err(|e| GuiError::windows("LoadCursorW", e))?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    // Stock brush objects are HBRUSH-compatible.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let serial = CLASS_SERIAL.fetch_add(1, Ordering::Relaxed);
    let class_name = wide(&format!("{CLASS_PREFIX}.{serial}"));

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        // Repaint the whole client area on resize.
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: PCWSTR(class_name.as_ptr()),
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles; class_name is
    // a null-terminated UTF-16 buffer alive for the call (the system copies it).
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }
    tracing::debug!(atom, serial, "window class registered");

    Ok(WindowClass {
        instance: hinstance.0 as isize,
        atom,
    })
}

// ── Window creation ───────────────────────────────────────────────────────────

/// Create a top-level window of `class`.  The window procedure receives
/// `WM_CREATE` before this returns.
pub(crate) fn create_window(
    class: &WindowClass,
    title: &str,
    width: i32,
    height: i32,
) -> Result<WindowHandle> {
    let title_wide = wide(title);

    // SAFETY: the class atom was registered by this module with this
    // instance; title_wide is null-terminated and outlives the call.
    // No parent, no menu, no creation parameter.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class.name(),
            PCWSTR(title_wide.as_ptr()),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            width,
            height,
            None,
            None,
            class.instance(),
            None,
        )
    }
    .map_err(|e| GuiError::windows("CreateWindowExW", e))?;

    let window = handle(hwnd);
    THREAD_WINDOWS.with(|w| w.borrow_mut().push(window));
    tracing::debug!(%window, title, width, height, "window created");
    Ok(window)
}

pub(crate) fn show_window(window: WindowHandle, show: ShowState) {
    let cmd: SHOW_WINDOW_CMD = match show {
        ShowState::Normal => SW_SHOWNORMAL,
        ShowState::Maximized => SW_SHOWMAXIMIZED,
        ShowState::Minimized => SW_SHOWMINIMIZED,
    };
    // SAFETY: window was returned by CreateWindowExW on this thread.
    // ShowWindow returns the previous visibility state; UpdateWindow returns
    // a success BOOL; neither matters here.
    unsafe {
        let _ = ShowWindow(hwnd(window), cmd);
        let _ = UpdateWindow(hwnd(window));
    }
}

/// Post `message` to `window`'s queue.  Callable from any thread.
pub(crate) fn post_message(window: WindowHandle, message: WindowMessage) -> Result<()> {
    let (id, wparam, lparam) = message.encode();
    // SAFETY: PostMessageW validates the handle itself and fails with
    // ERROR_INVALID_WINDOW_HANDLE for stale ones.
    unsafe { PostMessageW(hwnd(window), id, WPARAM(wparam), LPARAM(lparam)) }
        .map_err(|_| GuiError::InvalidWindow(window))
}

// ── Message loop ──────────────────────────────────────────────────────────────

thread_local! {
    // Windows created on this thread, destroyed with its `MessageQueue`.
    static THREAD_WINDOWS: RefCell<Vec<WindowHandle>> = const { RefCell::new(Vec::new()) };
}

/// The calling thread's Win32 message queue.  The system creates it lazily.
/// Windows created on the thread are destroyed when it is dropped.
pub(crate) struct MessageQueue {
    _private: (),
}

impl MessageQueue {
    pub(crate) fn for_current_thread() -> Self {
        THREAD_WINDOWS.with(|w| w.borrow_mut().clear());
        Self { _private: () }
    }
}

impl Drop for MessageQueue {
    fn drop(&mut self) {
        let windows = THREAD_WINDOWS.with(|w| std::mem::take(&mut *w.borrow_mut()));
        for window in windows {
            // SAFETY: DestroyWindow validates the handle itself; windows
            // already destroyed by a WM_CLOSE or WM_DESTROY just fail.  This
            // runs on the creating thread, as DestroyWindow requires.
            if unsafe { DestroyWindow(hwnd(window)) }.is_ok() {
                tracing::debug!(%window, "window destroyed with its queue");
            }
        }
    }
}

impl MessageSource for MessageQueue {
    type Message = MSG;

    fn retrieve(&mut self) -> Result<Retrieved<MSG>> {
        let mut msg = MSG::default();
        // SAFETY: &mut msg is a valid MSG pointer; a null HWND retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved; wParam is the exit code.
            0 => Ok(Retrieved::Quit {
                exit_code: msg.wParam.0,
            }),
            _ => {
                tracing::trace!(
                    window = %handle(msg.hwnd),
                    id = msg.message,
                    wparam = msg.wParam.0,
                    lparam = msg.lParam.0,
                    "retrieved"
                );
                Ok(Retrieved::Message(msg))
            }
        }
    }

    fn dispatch(&mut self, msg: &MSG) {
        // SAFETY: msg was populated by a successful GetMessageW call.
        // TranslateMessage's return value (whether it generated WM_CHAR)
        // and DispatchMessageW's LRESULT are intentionally unused.
        unsafe {
            let _ = TranslateMessage(msg);
            DispatchMessageW(msg);
        }
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

struct Win32Ops;

impl WindowOps for Win32Ops {
    fn invalidate(&self, window: WindowHandle) {
        // SAFETY: window is the handle the OS passed to wnd_proc.
        unsafe {
            let _ = InvalidateRect(hwnd(window), None, false);
        }
    }

    fn validate(&self, window: WindowHandle) {
        // SAFETY: as above; a null rect validates the whole client area.
        unsafe {
            let _ = ValidateRect(hwnd(window), None);
        }
    }

    fn post_quit(&self, exit_code: i32) {
        // SAFETY: posts WM_QUIT to the calling thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; renderers are looked up by handle in the registry,
// never through window user data.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = WindowMessage::decode(msg, wparam.0, lparam.0);
    match dispatch::window_proc(&Win32Ops, handle(hwnd), message) {
        Reply::Handled(result) => LRESULT(result),
        // Default processing for all unhandled messages.
        Reply::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Error dialog ──────────────────────────────────────────────────────────────

/// Show a modal error dialog with the given message.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
/// Used by `main()` when startup or the loop fails.
pub fn show_error_dialog(message: &str) {
    let msg_wide = wide(message);
    let title_wide = wide("GUI Shell: fatal error");

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // A null owner means the dialog has no owner window.
    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn handle(hwnd: HWND) -> WindowHandle {
    WindowHandle::from_raw(hwnd.0 as isize)
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as *mut c_void)
}

/// Capture the current Win32 last-error code and wrap it in a `GuiError`.
///
/// Call immediately after a Win32 function that signals failure.  `GetLastError`
/// reads thread-local state that any subsequent API call can overwrite.
fn last_error(function: &'static str) -> GuiError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    GuiError::Win32 {
        function,
        code: code.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
