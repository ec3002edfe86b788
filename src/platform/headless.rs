// ── Headless platform ─────────────────────────────────────────────────────────
//
// Stand-in for the OS windowing layer on non-Windows targets.  A "window" is
// a process-unique handle plus the sending half of its creating thread's
// message channel.  Delivery order follows what Win32 does for a plain
// overlapped window:
//
//   create_window  → create (synchronous)
//   show_window    → size(creation size) then paint (synchronous)
//   invalidate     → paint (queued)
//   post_quit      → quit (queued on the calling thread)
//   close, default → destroy (synchronous)
//
// Messages for destroyed windows are dropped, as the OS does.

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{
        atomic::{AtomicIsize, AtomicU16, Ordering},
        mpsc::{self, Receiver, Sender},
        Mutex, MutexGuard, OnceLock, PoisonError,
    },
};

use crate::{
    config::ShowState,
    dispatch::{self, Reply, WindowOps},
    error::{GuiError, Result},
    event_loop::{MessageSource, Retrieved},
    window::{WindowHandle, WindowMessage, WM_CREATE, WM_DESTROY, WM_PAINT, WM_QUIT},
};

// ── Process-wide window table ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub(crate) struct RawMessage {
    window: WindowHandle,
    id: u32,
    wparam: usize,
    lparam: isize,
}

struct HeadlessWindow {
    queue: Sender<RawMessage>,
    width: u32,
    height: u32,
}

static NEXT_WINDOW: AtomicIsize = AtomicIsize::new(0x1_0000);
static NEXT_ATOM: AtomicU16 = AtomicU16::new(0xC000);

fn windows() -> MutexGuard<'static, HashMap<WindowHandle, HeadlessWindow>> {
    static WINDOWS: OnceLock<Mutex<HashMap<WindowHandle, HeadlessWindow>>> = OnceLock::new();
    WINDOWS
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn is_live(window: WindowHandle) -> bool {
    windows().contains_key(&window)
}

// ── Per-thread queue ──────────────────────────────────────────────────────────

struct ThreadQueue {
    tx: Sender<RawMessage>,
    windows: Vec<WindowHandle>,
}

thread_local! {
    static THREAD_QUEUE: RefCell<Option<ThreadQueue>> = const { RefCell::new(None) };
}

fn post_to_thread(message: RawMessage) {
    THREAD_QUEUE.with(|q| {
        if let Some(q) = q.borrow().as_ref() {
            let _ = q.tx.send(message);
        }
    });
}

/// The calling thread's message queue.  Windows created on the thread are
/// destroyed when it is dropped.
pub(crate) struct MessageQueue {
    rx: Receiver<RawMessage>,
}

impl MessageQueue {
    pub(crate) fn for_current_thread() -> Self {
        let (tx, rx) = mpsc::channel();
        THREAD_QUEUE.with(|q| {
            *q.borrow_mut() = Some(ThreadQueue {
                tx,
                windows: Vec::new(),
            });
        });
        Self { rx }
    }
}

impl Drop for MessageQueue {
    fn drop(&mut self) {
        let Some(queue) = THREAD_QUEUE.with(|q| q.borrow_mut().take()) else {
            return;
        };
        let mut table = windows();
        for window in queue.windows {
            table.remove(&window);
        }
    }
}

impl MessageSource for MessageQueue {
    type Message = RawMessage;

    fn retrieve(&mut self) -> Result<Retrieved<RawMessage>> {
        let message = self.rx.recv().map_err(|_| GuiError::QueueClosed)?;
        tracing::trace!(window = %message.window, id = message.id, "retrieved");
        if message.id == WM_QUIT {
            return Ok(Retrieved::Quit {
                exit_code: message.wparam,
            });
        }
        Ok(Retrieved::Message(message))
    }

    fn dispatch(&mut self, message: &RawMessage) {
        deliver(message.window, message.id, message.wparam, message.lparam);
    }
}

// ── Window procedure glue ─────────────────────────────────────────────────────

struct HeadlessOps;

impl WindowOps for HeadlessOps {
    fn invalidate(&self, window: WindowHandle) {
        let _ = post_message(window, WindowMessage::Paint);
    }

    fn validate(&self, _window: WindowHandle) {
        // Invalid regions are not tracked; every queued paint is delivered.
    }

    fn post_quit(&self, exit_code: i32) {
        post_to_thread(RawMessage {
            window: WindowHandle::from_raw(0),
            id: WM_QUIT,
            // Sign-extended, as PostQuitMessage stores it in wParam.
            wparam: exit_code as isize as usize,
            lparam: 0,
        });
    }
}

/// Run one message through the window procedure, synchronously.
fn deliver(window: WindowHandle, id: u32, wparam: usize, lparam: isize) {
    if !is_live(window) {
        return;
    }
    let message = WindowMessage::decode(id, wparam, lparam);
    if let Reply::Default = dispatch::window_proc(&HeadlessOps, window, message) {
        default_proc(window, message);
    }
    if message == WindowMessage::Destroy {
        windows().remove(&window);
    }
}

/// Default processing: close destroys the window, everything else is ignored.
fn default_proc(window: WindowHandle, message: WindowMessage) {
    if message == WindowMessage::Close {
        deliver(window, WM_DESTROY, 0, 0);
    }
}

// ── Window class ──────────────────────────────────────────────────────────────

/// A registered window class.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowClass {
    atom: u16,
}

impl WindowClass {
    pub(crate) fn atom(&self) -> u16 {
        self.atom
    }
}

pub(crate) fn register_class() -> Result<WindowClass> {
    let atom = NEXT_ATOM.fetch_add(1, Ordering::Relaxed);
    Ok(WindowClass { atom })
}

// ── Drawing factory ───────────────────────────────────────────────────────────

/// Headless builds have no drawing API; this marker stands in for the
/// Direct2D factory so `Application` has the same shape on every target.
#[derive(Debug)]
pub struct DrawingFactory {
    _private: (),
}

pub(crate) fn create_drawing_factory() -> Result<DrawingFactory> {
    Ok(DrawingFactory { _private: () })
}

// ── Windows ───────────────────────────────────────────────────────────────────

/// Create a window on the calling thread, which must own a `MessageQueue`.
pub(crate) fn create_window(
    class: &WindowClass,
    title: &str,
    width: i32,
    height: i32,
) -> Result<WindowHandle> {
    let window = WindowHandle::from_raw(NEXT_WINDOW.fetch_add(1, Ordering::Relaxed));
    let queue = THREAD_QUEUE
        .with(|q| {
            let mut q = q.borrow_mut();
            let q = q.as_mut()?;
            q.windows.push(window);
            Some(q.tx.clone())
        })
        .ok_or(GuiError::QueueClosed)?;

    windows().insert(
        window,
        HeadlessWindow {
            queue,
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        },
    );
    tracing::debug!(%window, atom = class.atom(), title, width, height, "window created");

    deliver(window, WM_CREATE, 0, 0);
    Ok(window)
}

/// Show and update: deliver the initial size and paint.
pub(crate) fn show_window(window: WindowHandle, show: ShowState) {
    let size = windows().get(&window).map(|w| (w.width, w.height));
    let Some((width, height)) = size else {
        return;
    };
    let (width, height) = match show {
        ShowState::Minimized => (0, 0),
        ShowState::Normal | ShowState::Maximized => (width, height),
    };
    let (id, wparam, lparam) = WindowMessage::Size { width, height }.encode();
    deliver(window, id, wparam, lparam);
    deliver(window, WM_PAINT, 0, 0);
}

/// Queue `message` for `window` on its owning thread.
pub(crate) fn post_message(window: WindowHandle, message: WindowMessage) -> Result<()> {
    let (id, wparam, lparam) = message.encode();
    let table = windows();
    let target = table.get(&window).ok_or(GuiError::InvalidWindow(window))?;
    target
        .queue
        .send(RawMessage {
            window,
            id,
            wparam,
            lparam,
        })
        .map_err(|_| GuiError::InvalidWindow(window))
}

/// Report a fatal error.  Without a desktop, stderr is the only output path.
pub fn show_error_dialog(message: &str) {
    eprintln!("gui-shell: fatal error: {message}");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posting_to_unknown_window_fails() {
        let window = WindowHandle::from_raw(-1);
        assert!(matches!(
            post_message(window, WindowMessage::Paint),
            Err(GuiError::InvalidWindow(w)) if w == window
        ));
    }

    #[test]
    fn create_without_queue_fails() {
        let class = register_class().expect("class");
        // Fresh test thread: no MessageQueue was created.
        assert!(matches!(
            create_window(&class, "t", 10, 10),
            Err(GuiError::QueueClosed)
        ));
    }

    #[test]
    fn destroy_posts_quit_and_dropping_queue_forgets_windows() {
        let class = register_class().expect("class");
        let mut queue = MessageQueue::for_current_thread();
        let window = create_window(&class, "t", 10, 10).expect("window");
        assert!(is_live(window));

        post_message(window, WindowMessage::Destroy).expect("post");
        let first = queue.retrieve().expect("destroy");
        assert!(matches!(first, Retrieved::Message(m) if m.id == WM_DESTROY));
        if let Retrieved::Message(m) = first {
            queue.dispatch(&m);
        }
        assert!(!is_live(window));
        assert!(matches!(
            queue.retrieve().expect("quit"),
            Retrieved::Quit { exit_code: 0 }
        ));

        let other = create_window(&class, "u", 10, 10).expect("window");
        drop(queue);
        assert!(!is_live(other));
    }

    #[test]
    fn registered_classes_get_distinct_atoms() {
        let a = register_class().expect("a");
        let b = register_class().expect("b");
        assert_ne!(a.atom(), b.atom());
    }
}
