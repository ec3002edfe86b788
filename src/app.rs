// ── Application lifecycle & top-level state ────────────────────────────────────
//
// One `Application` owns one registered window class, an optional drawing
// factory, and the registry of windows it created.  Each `run_loop` call
// spawns a dedicated thread that creates one window and pumps its messages;
// the result arrives exactly once on the returned channel.

use std::{
    sync::{
        mpsc::{self, Receiver},
        Arc, Mutex,
    },
    thread,
};

use tracing::Level;

use crate::{
    config::{Config, ShowState},
    dpi,
    error::{GuiError, Result},
    event_loop::{self, Completion},
    logging,
    platform::native::{self, DrawingFactory, WindowClass},
    registry::{self, LoopScope, Registry, SharedRegistry},
    renderer::Renderer,
    window::{WindowHandle, WindowMessage},
};

/// A native GUI application: one window class, any number of loops.
pub struct Application {
    class: Option<WindowClass>,
    factory: Option<DrawingFactory>,
    registry: SharedRegistry,
    show: ShowState,
    log_level: Level,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// An uninitialised application; call `init` before `run_loop`.
    pub fn new() -> Self {
        Self {
            class: None,
            factory: None,
            registry: Arc::new(Mutex::new(Registry::default())),
            show: ShowState::Normal,
            log_level: Level::INFO,
        }
    }

    /// An uninitialised application that takes its show state and log level
    /// from `config`.  An unparseable level falls back to `info`.
    pub fn from_config(config: &Config) -> Self {
        let mut app = Self::new();
        app.show = config.show;
        app.log_level = logging::parse_level(&config.log.level).unwrap_or(Level::INFO);
        app
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Register the window class.  Also creates the drawing factory when the
    /// platform has one; failing to do so is logged, not fatal.
    pub fn init(&mut self) -> Result<()> {
        if self.class.is_some() {
            return Err(GuiError::AlreadyInitialized);
        }

        let class = native::register_class()?;
        self.class = Some(class);

        match native::create_drawing_factory() {
            Ok(factory) => self.factory = Some(factory),
            Err(e) => tracing::warn!(error = %e, "drawing factory unavailable"),
        }

        tracing::info!(?class, "application initialised");
        Ok(())
    }

    /// Release the drawing factory.  Safe to call any number of times,
    /// including on an application that was never initialised.
    pub fn deinit(&mut self) {
        if self.factory.take().is_some() {
            tracing::info!("drawing factory released");
        }
    }

    /// Install the stderr logger at this application's log level.
    pub fn enable_log(&mut self) -> Result<()> {
        logging::install(self.log_level)
    }

    // ── Message loop ──────────────────────────────────────────────────────────

    /// Open one window on a dedicated thread and pump its messages until quit.
    ///
    /// `width` and `height` are at 96 DPI; with a renderer they are scaled by
    /// its reported DPI first.  The receiver yields exactly one value: `Ok(())`
    /// after a clean quit, otherwise the error that ended the loop.
    pub fn run_loop(
        &self,
        window_name: &str,
        width: i32,
        height: i32,
        renderer: Option<Box<dyn Renderer>>,
    ) -> Receiver<Result<()>> {
        let (tx, rx) = mpsc::sync_channel(1);
        let completion = Completion::new(tx);

        let Some(class) = self.class else {
            completion.send(Err(GuiError::NotInitialized));
            return rx;
        };

        let job = LoopJob {
            class,
            registry: Arc::clone(&self.registry),
            show: self.show,
            title: window_name.to_owned(),
            width,
            height,
            renderer,
        };

        // Message retrieval must happen on the thread that created the window;
        // the whole job therefore runs on one dedicated thread.  If spawning
        // fails the closure, and the completion inside it, is dropped, which
        // reports `WorkerExited`.
        let spawned = thread::Builder::new()
            .name("gui-loop".to_owned())
            .spawn(move || {
                let result = job.run();
                if let Err(e) = &result {
                    tracing::debug!(error = %e, "message loop ended with error");
                }
                completion.send(result);
            });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "cannot spawn message loop thread");
        }

        rx
    }

    // ── Queries & posting ─────────────────────────────────────────────────────

    /// Live windows created by this application's loops.
    pub fn windows(&self) -> Vec<WindowHandle> {
        registry::lock(&self.registry).windows()
    }

    /// Whether `window` currently has a renderer attached.
    pub fn has_renderer(&self, window: WindowHandle) -> bool {
        registry::lock(&self.registry).has_renderer(window)
    }

    /// Whether `init` has registered the window class.
    pub fn is_initialized(&self) -> bool {
        self.class.is_some()
    }

    /// The drawing factory, if the platform provided one.
    pub fn drawing_factory(&self) -> Option<&DrawingFactory> {
        self.factory.as_ref()
    }

    /// Post `message` to one of this application's windows.  Delivery happens
    /// on the window's loop thread.
    pub fn post_message(&self, window: WindowHandle, message: WindowMessage) -> Result<()> {
        if !registry::lock(&self.registry).contains(window) {
            return Err(GuiError::InvalidWindow(window));
        }
        native::post_message(window, message)
    }

    /// Ask `window` to close.  Default processing destroys it, which ends its
    /// loop cleanly.
    pub fn close_window(&self, window: WindowHandle) -> Result<()> {
        self.post_message(window, WindowMessage::Close)
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.deinit();
    }
}

// ── Loop worker ───────────────────────────────────────────────────────────────

/// Everything the loop thread needs, moved into it at spawn time.
struct LoopJob {
    class: WindowClass,
    registry: SharedRegistry,
    show: ShowState,
    title: String,
    width: i32,
    height: i32,
    renderer: Option<Box<dyn Renderer>>,
}

impl LoopJob {
    fn run(self) -> Result<()> {
        // Drop order matters: the queue destroys any window still alive on
        // this thread, then the scope deinits the renderer.
        let scope = LoopScope::enter(self.registry);

        let (mut width, mut height) = (self.width, self.height);
        if let Some(mut renderer) = self.renderer {
            // No deinit for a renderer whose init failed.
            renderer.init()?;
            let dpi = renderer.dpi();
            (width, height) = dpi::scale_size(width, height, dpi);
            tracing::debug!(?dpi, width, height, "window size scaled");
            scope.stage(renderer);
        }

        let mut queue = native::MessageQueue::for_current_thread();
        let window = native::create_window(&self.class, &self.title, width, height)?;
        native::show_window(window, self.show);
        tracing::info!(%window, title = %self.title, "message loop started");

        let result = event_loop::pump(&mut queue);
        tracing::info!(%window, ok = result.is_ok(), "message loop finished");
        drop(queue);
        drop(scope);
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
