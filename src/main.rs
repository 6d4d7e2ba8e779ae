mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::MbtiDashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([640.0, 420.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "MBTI by Country – Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(MbtiDashboardApp::new(config)))),
    )
}
