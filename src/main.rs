//! Application entry point — Neko Judge.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the [`JudgeProvider`] from config.
//! 5. Create pipeline channels (`command`, `result`).
//! 6. Spawn the pipeline runner on the tokio runtime.
//! 7. Spawn one recorder thread per party.
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use eframe::egui;
use tokio::sync::mpsc;

use neko_judge::{
    app::JudgeApp,
    audio::Recorder,
    case::Party,
    config::AppConfig,
    pipeline::{PipelineCommand, PipelineResult, PipelineRunner},
    provider::build_provider,
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (w, h) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([w, h])
        .with_min_inner_size([640.0, 480.0]);

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neko Judge starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    if config.judge.api_key.as_deref().unwrap_or("").is_empty() {
        log::warn!("No API key configured; judgment requests will fail");
    }

    // 3. Tokio runtime (2 workers — judgment and transcription can overlap)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Provider
    let provider = build_provider(&config);

    // 5. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<PipelineCommand>(16);
    let (result_tx, result_rx) = mpsc::channel::<PipelineResult>(32);

    // 6. Spawn pipeline runner onto the tokio runtime
    rt.spawn(PipelineRunner::new(provider).run(command_rx, result_tx));

    // 7. One recorder control thread per party; each owns its cpal stream
    //    for the duration of a recording session.
    let recorders = [Recorder::new(Party::A), Recorder::new(Party::B)];

    // 8. Build the egui app and run it (blocks until the window is closed)
    let options = native_options(&config);
    let app = JudgeApp::new(command_tx, result_rx, recorders, config);

    eframe::run_native("猫猫法官", options, Box::new(move |_cc| Ok(Box::new(app))))
}
