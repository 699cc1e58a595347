#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use pin_note::config::ConfigStore;
use pin_note::gui::{NoteApp, BASE_SIZE};
use pin_note::{logging, paths};

fn main() -> anyhow::Result<()> {
    let debug = std::env::args().any(|a| a == "--debug");
    logging::init(debug);

    let store = ConfigStore::new(paths::data_dir());
    tracing::info!("data dir: {}", store.dir().display());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(BASE_SIZE)
            .with_min_inner_size([BASE_SIZE.x * 0.6, BASE_SIZE.y * 0.6])
            .with_always_on_top()
            .with_decorations(false)
            .with_transparent(true)
            .with_title("Pin'Note"),
        ..Default::default()
    };

    eframe::run_native(
        "Pin'Note",
        native_options,
        Box::new(move |cc| Box::new(NoteApp::new(cc, store))),
    )
    .map_err(|e| anyhow::anyhow!("window loop failed: {e}"))
}
