// ── Renderer capability ───────────────────────────────────────────────────────
//
// The shell never draws anything itself.  A caller hands `run_loop` an
// optional renderer; the loop owns it from then on and drives it from the
// window procedure.

use crate::{error::Result, window::WindowHandle};

/// Caller-supplied drawing capability.
///
/// The loop calls these in the order `init` → {`update` | `draw`}* →
/// `deinit`, always from the loop's own thread and never concurrently.
/// `deinit` is called exactly once if and only if `init` succeeded.
pub trait Renderer: Send {
    /// Acquire device resources.  A failure aborts the loop before any window
    /// is created.
    fn init(&mut self) -> Result<()>;

    /// Release everything `init` acquired.
    fn deinit(&mut self);

    /// Horizontal and vertical DPI used to scale the requested window size.
    fn dpi(&self) -> (f32, f32);

    /// The client area was resized to `width` x `height` pixels.
    fn update(&mut self, width: u32, height: u32) -> Result<()>;

    /// Paint the contents of `window`.
    fn draw(&mut self, window: WindowHandle) -> Result<()>;
}
