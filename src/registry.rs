// ── Window → renderer registry ────────────────────────────────────────────────
//
// The `Application` owns a `Registry` mapping every live window it created to
// the renderer attached to it.  The window procedure looks renderers up by
// window handle; nothing is ever smuggled through the window's user-data
// word.
//
// Each loop thread additionally carries a `LoopContext` in thread-local
// storage: the renderer staged for the window about to be created, the
// windows this thread owns, and renderers whose window was already
// destroyed.  `LoopScope` installs the context and, on drop, calls `deinit`
// on every renderer the thread still holds.  That drop is the only place
// `deinit` is ever called.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{renderer::Renderer, window::WindowHandle};

// ── Registry ──────────────────────────────────────────────────────────────────

/// Live windows and their optional renderers.
#[derive(Default)]
pub(crate) struct Registry {
    windows: BTreeMap<WindowHandle, Option<Box<dyn Renderer>>>,
}

impl Registry {
    /// Every live window, in handle order.
    pub(crate) fn windows(&self) -> Vec<WindowHandle> {
        self.windows.keys().copied().collect()
    }

    pub(crate) fn contains(&self, window: WindowHandle) -> bool {
        self.windows.contains_key(&window)
    }

    pub(crate) fn has_renderer(&self, window: WindowHandle) -> bool {
        matches!(self.windows.get(&window), Some(Some(_)))
    }

    fn insert(&mut self, window: WindowHandle, renderer: Option<Box<dyn Renderer>>) {
        self.windows.insert(window, renderer);
    }

    fn remove(&mut self, window: WindowHandle) -> Option<Box<dyn Renderer>> {
        self.windows.remove(&window).flatten()
    }

    fn renderer_mut(&mut self, window: WindowHandle) -> Option<&mut Box<dyn Renderer>> {
        self.windows.get_mut(&window)?.as_mut()
    }
}

pub(crate) type SharedRegistry = Arc<Mutex<Registry>>;

/// Lock the registry, ignoring poisoning: a panicking renderer must not take
/// the bookkeeping down with it.
pub(crate) fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Per-thread loop context ───────────────────────────────────────────────────

struct LoopContext {
    registry: SharedRegistry,
    /// Renderer waiting for its window's create message.
    staged: Option<Box<dyn Renderer>>,
    /// Windows created on this thread and not yet destroyed.
    owned: Vec<WindowHandle>,
    /// Renderers detached from destroyed windows, awaiting `deinit`.
    retired: Vec<Box<dyn Renderer>>,
}

thread_local! {
    static CONTEXT: RefCell<Option<LoopContext>> = const { RefCell::new(None) };

    // Set while a renderer callback runs with the registry locked.  Messages
    // delivered re-entrantly from inside the callback must not touch the
    // registry again.
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

fn current_registry() -> Option<SharedRegistry> {
    CONTEXT.with(|c| c.borrow().as_ref().map(|ctx| Arc::clone(&ctx.registry)))
}

/// Guard for one message loop on the current thread.
///
/// Not `Send`: it must be dropped on the thread that entered it.
pub(crate) struct LoopScope {
    _thread_bound: PhantomData<*const ()>,
}

impl LoopScope {
    pub(crate) fn enter(registry: SharedRegistry) -> Self {
        CONTEXT.with(|c| {
            let previous = c.borrow_mut().replace(LoopContext {
                registry,
                staged: None,
                owned: Vec::new(),
                retired: Vec::new(),
            });
            debug_assert!(previous.is_none(), "nested message loops on one thread");
        });
        Self {
            _thread_bound: PhantomData,
        }
    }

    /// Hold an initialised renderer until the next window created on this
    /// thread receives its create message.
    pub(crate) fn stage(&self, renderer: Box<dyn Renderer>) {
        CONTEXT.with(|c| {
            if let Some(ctx) = c.borrow_mut().as_mut() {
                ctx.staged = Some(renderer);
            }
        });
    }
}

impl Drop for LoopScope {
    fn drop(&mut self) {
        let Some(ctx) = CONTEXT.with(|c| c.borrow_mut().take()) else {
            return;
        };

        let mut leftovers = ctx.retired;
        leftovers.extend(ctx.staged);
        {
            let mut registry = lock(&ctx.registry);
            for window in ctx.owned {
                leftovers.extend(registry.remove(window));
            }
        }

        for mut renderer in leftovers {
            renderer.deinit();
        }
    }
}

// ── Window-procedure entry points ─────────────────────────────────────────────

/// Register `window` and attach the staged renderer, if any.
///
/// Only the first create for a window counts; a repeated create leaves the
/// attached renderer and the staging slot alone.
pub(crate) fn attach_staged(window: WindowHandle) {
    if IN_CALLBACK.with(Cell::get) {
        return;
    }
    let attached = CONTEXT.with(|c| {
        let mut c = c.borrow_mut();
        let ctx = c.as_mut()?;
        if ctx.owned.contains(&window) {
            return None;
        }
        ctx.owned.push(window);
        Some((Arc::clone(&ctx.registry), ctx.staged.take()))
    });
    if let Some((registry, renderer)) = attached {
        lock(&registry).insert(window, renderer);
    }
}

/// Run `f` against the renderer attached to `window`.
///
/// Returns `false` without calling `f` when there is no renderer: no loop
/// context on this thread, an unknown window, a window without renderer, or
/// a re-entrant call from inside another renderer callback.
pub(crate) fn with_renderer<F>(window: WindowHandle, f: F) -> bool
where
    F: FnOnce(&mut dyn Renderer),
{
    if IN_CALLBACK.with(Cell::get) {
        return false;
    }
    let Some(registry) = current_registry() else {
        return false;
    };
    let mut registry = lock(&registry);
    let Some(renderer) = registry.renderer_mut(window) else {
        return false;
    };

    IN_CALLBACK.with(|flag| flag.set(true));
    f(&mut **renderer);
    IN_CALLBACK.with(|flag| flag.set(false));
    true
}

/// Detach `window` from the registry.  Its renderer is kept until the loop
/// scope ends so `deinit` still runs exactly once, after the last callback.
pub(crate) fn retire(window: WindowHandle) {
    if IN_CALLBACK.with(Cell::get) {
        // Cleaned up with the rest of this thread's windows when the scope ends.
        return;
    }
    let Some(registry) = current_registry() else {
        return;
    };
    let renderer = lock(&registry).remove(window);
    CONTEXT.with(|c| {
        if let Some(ctx) = c.borrow_mut().as_mut() {
            ctx.owned.retain(|w| *w != window);
            ctx.retired.extend(renderer);
        }
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockRenderer};

    fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Registry::default()))
    }

    #[test]
    fn create_attaches_the_staged_renderer() {
        let registry = shared();
        let (renderer, _calls) = MockRenderer::new();
        let scope = LoopScope::enter(Arc::clone(&registry));
        scope.stage(Box::new(renderer));

        let window = WindowHandle::from_raw(1);
        attach_staged(window);

        let reg = lock(&registry);
        assert!(reg.contains(window));
        assert!(reg.has_renderer(window));
    }

    #[test]
    fn window_without_renderer_is_still_registered() {
        let registry = shared();
        let _scope = LoopScope::enter(Arc::clone(&registry));
        let window = WindowHandle::from_raw(2);
        attach_staged(window);

        assert!(lock(&registry).contains(window));
        assert!(!with_renderer(window, |_| panic!("no renderer expected")));
    }

    #[test]
    fn scope_drop_deinits_attached_renderer_once_and_unregisters() {
        let registry = shared();
        let (renderer, calls) = MockRenderer::new();
        let window = WindowHandle::from_raw(3);
        {
            let scope = LoopScope::enter(Arc::clone(&registry));
            scope.stage(Box::new(renderer));
            attach_staged(window);
        }
        assert_eq!(calls.snapshot(), vec![Call::Deinit]);
        assert!(lock(&registry).windows().is_empty());
    }

    #[test]
    fn staged_renderer_without_window_is_still_deinited() {
        let registry = shared();
        let (renderer, calls) = MockRenderer::new();
        {
            let scope = LoopScope::enter(Arc::clone(&registry));
            scope.stage(Box::new(renderer));
        }
        assert_eq!(calls.snapshot(), vec![Call::Deinit]);
    }

    #[test]
    fn retired_renderer_is_deinited_when_scope_ends_not_before() {
        let registry = shared();
        let (renderer, calls) = MockRenderer::new();
        let window = WindowHandle::from_raw(4);
        let scope = LoopScope::enter(Arc::clone(&registry));
        scope.stage(Box::new(renderer));
        attach_staged(window);

        retire(window);
        assert!(!lock(&registry).contains(window));
        assert!(calls.snapshot().is_empty());

        drop(scope);
        assert_eq!(calls.snapshot(), vec![Call::Deinit]);
    }

    #[test]
    fn repeated_create_keeps_the_attached_renderer() {
        let registry = shared();
        let (renderer, calls) = MockRenderer::new();
        let window = WindowHandle::from_raw(7);
        let scope = LoopScope::enter(Arc::clone(&registry));
        scope.stage(Box::new(renderer));
        attach_staged(window);

        attach_staged(window);
        assert!(lock(&registry).has_renderer(window));
        assert!(calls.snapshot().is_empty());

        drop(scope);
        assert_eq!(calls.snapshot(), vec![Call::Deinit]);
        assert!(lock(&registry).windows().is_empty());
    }

    #[test]
    fn lookups_without_a_loop_context_see_no_renderer() {
        assert!(!with_renderer(WindowHandle::from_raw(5), |_| {}));
        // Must not panic either.
        attach_staged(WindowHandle::from_raw(5));
        retire(WindowHandle::from_raw(5));
    }

    #[test]
    fn reentrant_lookup_sees_no_renderer() {
        let registry = shared();
        let (renderer, _calls) = MockRenderer::new();
        let window = WindowHandle::from_raw(6);
        let scope = LoopScope::enter(Arc::clone(&registry));
        scope.stage(Box::new(renderer));
        attach_staged(window);

        let mut inner_ran = None;
        let outer_ran = with_renderer(window, |_| {
            inner_ran = Some(with_renderer(window, |_| {}));
        });
        assert!(outer_ran);
        assert_eq!(inner_ran, Some(false));
        // The flag is cleared again afterwards.
        assert!(with_renderer(window, |_| {}));
    }
}
