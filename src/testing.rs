// ── Test doubles ──────────────────────────────────────────────────────────────
//
// Shared by the unit tests of `registry`, `dispatch` and `app`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    error::{GuiError, Result},
    renderer::Renderer,
    window::WindowHandle,
};

/// One observed renderer callback.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Init,
    Deinit,
    Update(u32, u32),
    Draw(WindowHandle),
}

/// Shared, cloneable view of the calls a `MockRenderer` received.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    pub(crate) fn snapshot(&self) -> Vec<Call> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Renderer that records every callback and can be told to fail.
pub(crate) struct MockRenderer {
    log: CallLog,
    pub(crate) dpi: (f32, f32),
    pub(crate) fail_init: bool,
    pub(crate) fail_draw: bool,
}

impl MockRenderer {
    pub(crate) fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        let renderer = Self {
            log: log.clone(),
            dpi: (96.0, 96.0),
            fail_init: false,
            fail_draw: false,
        };
        (renderer, log)
    }
}

impl Renderer for MockRenderer {
    fn init(&mut self) -> Result<()> {
        self.log.push(Call::Init);
        if self.fail_init {
            return Err(GuiError::renderer("init refused"));
        }
        Ok(())
    }

    fn deinit(&mut self) {
        self.log.push(Call::Deinit);
    }

    fn dpi(&self) -> (f32, f32) {
        self.dpi
    }

    fn update(&mut self, width: u32, height: u32) -> Result<()> {
        self.log.push(Call::Update(width, height));
        Ok(())
    }

    fn draw(&mut self, window: WindowHandle) -> Result<()> {
        self.log.push(Call::Draw(window));
        if self.fail_draw {
            return Err(GuiError::renderer("draw failed"));
        }
        Ok(())
    }
}
