// ── Diagnostic logging ────────────────────────────────────────────────────────
//
// The crate emits `tracing` events everywhere; nothing is printed until a
// subscriber is installed.  `install` sets up a stderr fmt subscriber once per
// process and is a no-op afterwards.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Level;

use crate::error::{GuiError, Result};

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Parse a level name (`trace` … `error`, case-insensitive).
pub fn parse_level(name: &str) -> Result<Level> {
    name.trim()
        .parse::<Level>()
        .map_err(|_| GuiError::Logging(format!("unknown log level {name:?}")))
}

/// Install the process-wide stderr subscriber at `level`.
///
/// Repeated calls succeed without changing anything.  Fails only when some
/// other subscriber was installed globally first.
pub fn install(level: Level) -> Result<()> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
    if let Err(e) = installed {
        INSTALLED.store(false, Ordering::SeqCst);
        return Err(GuiError::Logging(e.to_string()));
    }
    tracing::info!(%level, "start logging");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!(parse_level("debug").expect("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").expect("warn"), Level::WARN);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = parse_level("loud").expect_err("must fail");
        assert!(err.to_string().contains("loud"));
    }
}
