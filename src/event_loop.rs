// ── Message loop ──────────────────────────────────────────────────────────────
//
// Retrieve → dispatch until the queue yields a quit message.  The platform
// backends provide the `MessageSource`; the quit-code policy and the
// exactly-once result delivery live here.

use std::sync::mpsc::SyncSender;

use crate::error::{GuiError, Result};

/// Outcome of one blocking retrieval.
#[derive(Debug)]
pub(crate) enum Retrieved<M> {
    /// A message to translate and dispatch.
    Message(M),
    /// The quit message; its payload is the exit code.
    Quit { exit_code: usize },
}

/// A thread's message queue.
pub(crate) trait MessageSource {
    type Message;

    /// Block until the next message arrives.  An error is fatal to the loop.
    fn retrieve(&mut self) -> Result<Retrieved<Self::Message>>;

    /// Translate and dispatch one message to its window procedure.
    fn dispatch(&mut self, message: &Self::Message);
}

/// Pump `source` until quit.
///
/// Exit code 0 is a clean shutdown; anything else is reported as
/// `GuiError::AbnormalQuit`.
pub(crate) fn pump<S: MessageSource>(source: &mut S) -> Result<()> {
    loop {
        match source.retrieve()? {
            Retrieved::Message(message) => source.dispatch(&message),
            Retrieved::Quit { exit_code: 0 } => {
                tracing::debug!("quit received");
                return Ok(());
            }
            Retrieved::Quit { exit_code } => {
                tracing::debug!(exit_code, "abnormal quit received");
                return Err(GuiError::AbnormalQuit { exit_code });
            }
        }
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

/// Sends the loop result exactly once.
///
/// If the worker unwinds, or is dropped before it ever ran, the drop sends
/// `GuiError::WorkerExited` instead.  The channel has capacity one, so the
/// send never blocks even if nobody is reading yet.
pub(crate) struct Completion {
    tx: Option<SyncSender<Result<()>>>,
}

impl Completion {
    pub(crate) fn new(tx: SyncSender<Result<()>>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn send(mut self, result: Result<()>) {
        if let Some(tx) = self.tx.take() {
            // The receiver may already be gone; nobody is left to tell.
            let _ = tx.try_send(result);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.try_send(Err(GuiError::WorkerExited));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
