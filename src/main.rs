// GUI-subsystem binary: no console window is allocated on Windows.
#![windows_subsystem = "windows"]

use eframe::egui;
use tiler::app::TilerApp;
use tiler::logger;

fn main() -> Result<(), eframe::Error> {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("Tiler"),
        ..Default::default()
    };

    eframe::run_native("Tiler", options, Box::new(|cc| Box::new(TilerApp::new(cc))))
}
