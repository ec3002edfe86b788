// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use gui_shell::{config, show_error_dialog, Application, GuiError};

fn main() {
    let config = config::load();

    let mut app = Application::from_config(&config);
    if config.log.enabled {
        if let Err(e) = app.enable_log() {
            // Logging is diagnostic only; carry on without it.
            eprintln!("{e}");
        }
    }

    if let Err(e) = run(&mut app, &config) {
        tracing::error!(error = %e, "fatal");
        show_error_dialog(&e.to_string());
        std::process::abort();
    }
    app.deinit();

    eprintln!("Done");
}

fn run(app: &mut Application, config: &config::Config) -> Result<(), GuiError> {
    app.init()?;
    let done = app.run_loop(&config.window_title, config.width, config.height, None);
    done.recv().map_err(|_| GuiError::WorkerExited)?
}
