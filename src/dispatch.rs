// ── Window procedure ──────────────────────────────────────────────────────────
//
// The dispatch table every window of the shell's class runs through.  OS side
// effects go through `WindowOps` so the same table drives both the Win32
// window procedure and the headless backend.
//
//   create          → attach staged renderer
//   size            → renderer.update(width, height)
//   display-change  → invalidate whole window
//   paint           → renderer.draw(window), then validate
//   destroy         → detach window, post quit(0)
//   anything else   → default processing

use crate::{
    registry,
    window::{WindowHandle, WindowMessage},
};

/// OS operations the dispatch table needs.
pub(crate) trait WindowOps {
    /// Mark the whole client area invalid so a paint gets scheduled.
    fn invalidate(&self, window: WindowHandle);
    /// Mark the whole client area valid.
    fn validate(&self, window: WindowHandle);
    /// Post a quit message to the calling thread's queue.
    fn post_quit(&self, exit_code: i32);
}

/// What the caller should return to the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reply {
    /// The message was handled; return this value.
    Handled(isize),
    /// Hand the message to default processing.
    Default,
}

pub(crate) fn window_proc<O: WindowOps>(ops: &O, window: WindowHandle, message: WindowMessage) -> Reply {
    tracing::trace!(%window, ?message, "window_proc");

    match message {
        WindowMessage::Create => {
            registry::attach_staged(window);
            Reply::Handled(0)
        }

        WindowMessage::Size { width, height } => {
            registry::with_renderer(window, |renderer| {
                if let Err(e) = renderer.update(width, height) {
                    tracing::warn!(%window, width, height, error = %e, "renderer update failed");
                }
            });
            Reply::Handled(0)
        }

        WindowMessage::DisplayChange => {
            ops.invalidate(window);
            Reply::Handled(0)
        }

        WindowMessage::Paint => {
            registry::with_renderer(window, |renderer| {
                if let Err(e) = renderer.draw(window) {
                    tracing::warn!(%window, error = %e, "renderer draw failed");
                }
            });
            // Validate even without a renderer, otherwise the OS keeps
            // re-sending paint for the same region.
            ops.validate(window);
            Reply::Handled(0)
        }

        WindowMessage::Destroy => {
            registry::retire(window);
            ops.post_quit(0);
            Reply::Handled(0)
        }

        WindowMessage::Close | WindowMessage::Quit { .. } | WindowMessage::Other { .. } => {
            Reply::Default
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        registry::{lock, LoopScope, Registry, SharedRegistry},
        testing::{Call, MockRenderer},
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Invalidate(WindowHandle),
        Validate(WindowHandle),
        PostQuit(i32),
    }

    #[derive(Default)]
    struct RecordingOps(RefCell<Vec<Op>>);

    impl RecordingOps {
        fn ops(&self) -> Vec<Op> {
            self.0.borrow().clone()
        }
    }

    impl WindowOps for RecordingOps {
        fn invalidate(&self, window: WindowHandle) {
            self.0.borrow_mut().push(Op::Invalidate(window));
        }
        fn validate(&self, window: WindowHandle) {
            self.0.borrow_mut().push(Op::Validate(window));
        }
        fn post_quit(&self, exit_code: i32) {
            self.0.borrow_mut().push(Op::PostQuit(exit_code));
        }
    }

    const WINDOW: WindowHandle = WindowHandle::from_raw(0x10);

    fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Registry::default()))
    }

    /// Enter a loop scope with `renderer` staged and deliver create.
    fn created_with(renderer: Option<MockRenderer>, registry: &SharedRegistry, ops: &RecordingOps) -> LoopScope {
        let scope = LoopScope::enter(Arc::clone(registry));
        if let Some(r) = renderer {
            scope.stage(Box::new(r));
        }
        assert_eq!(window_proc(ops, WINDOW, WindowMessage::Create), Reply::Handled(0));
        scope
    }

    #[test]
    fn size_before_paint_updates_once_then_draws() {
        let registry = shared();
        let ops = RecordingOps::default();
        let (renderer, calls) = MockRenderer::new();
        let _scope = created_with(Some(renderer), &registry, &ops);

        window_proc(&ops, WINDOW, WindowMessage::Size { width: 800, height: 600 });
        window_proc(&ops, WINDOW, WindowMessage::Paint);

        assert_eq!(calls.snapshot(), vec![Call::Update(800, 600), Call::Draw(WINDOW)]);
        assert_eq!(ops.ops(), vec![Op::Validate(WINDOW)]);
    }

    #[test]
    fn display_change_invalidates_without_touching_renderer() {
        let registry = shared();
        let ops = RecordingOps::default();
        let (renderer, calls) = MockRenderer::new();
        let _scope = created_with(Some(renderer), &registry, &ops);

        let reply = window_proc(&ops, WINDOW, WindowMessage::DisplayChange);

        assert_eq!(reply, Reply::Handled(0));
        assert_eq!(ops.ops(), vec![Op::Invalidate(WINDOW)]);
        assert!(calls.snapshot().is_empty());
    }

    #[test]
    fn paint_without_renderer_still_validates() {
        let registry = shared();
        let ops = RecordingOps::default();
        let _scope = created_with(None, &registry, &ops);

        window_proc(&ops, WINDOW, WindowMessage::Size { width: 1, height: 1 });
        window_proc(&ops, WINDOW, WindowMessage::Paint);

        assert_eq!(ops.ops(), vec![Op::Validate(WINDOW)]);
    }

    #[test]
    fn destroy_posts_clean_quit_and_detaches_window() {
        let registry = shared();
        let ops = RecordingOps::default();
        let (renderer, calls) = MockRenderer::new();
        let scope = created_with(Some(renderer), &registry, &ops);
        assert!(lock(&registry).contains(WINDOW));

        let reply = window_proc(&ops, WINDOW, WindowMessage::Destroy);

        assert_eq!(reply, Reply::Handled(0));
        assert_eq!(ops.ops(), vec![Op::PostQuit(0)]);
        assert!(!lock(&registry).contains(WINDOW));

        // Messages after destroy no longer reach the renderer.
        window_proc(&ops, WINDOW, WindowMessage::Paint);
        drop(scope);
        assert_eq!(calls.snapshot(), vec![Call::Deinit]);
    }

    #[test]
    fn unhandled_messages_go_to_default_processing() {
        let ops = RecordingOps::default();
        for message in [
            WindowMessage::Close,
            WindowMessage::Quit { exit_code: 0 },
            WindowMessage::Other { id: 0x0200, wparam: 0, lparam: 0 },
        ] {
            assert_eq!(window_proc(&ops, WINDOW, message), Reply::Default);
        }
        assert!(ops.ops().is_empty());
    }

    #[test]
    fn renderer_draw_failure_does_not_stop_dispatch() {
        let registry = shared();
        let ops = RecordingOps::default();
        let (mut renderer, calls) = MockRenderer::new();
        renderer.fail_draw = true;
        let _scope = created_with(Some(renderer), &registry, &ops);

        window_proc(&ops, WINDOW, WindowMessage::Paint);
        window_proc(&ops, WINDOW, WindowMessage::Paint);

        assert_eq!(calls.snapshot(), vec![Call::Draw(WINDOW), Call::Draw(WINDOW)]);
        assert_eq!(ops.ops(), vec![Op::Validate(WINDOW), Op::Validate(WINDOW)]);
    }
}
