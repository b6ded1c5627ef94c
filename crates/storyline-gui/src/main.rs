//! storyline-gui: Timeline editor application

mod app;
mod panels;

use std::path::PathBuf;

use app::StorylineApp;
use eframe::NativeOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("storyline=debug".parse().unwrap())
            .add_directive("wgpu=warn".parse().unwrap())
            .add_directive("eframe=warn".parse().unwrap()))
        .init();

    tracing::info!("Starting Storyline");

    let project_path = std::env::args_os().nth(1).map(PathBuf::from);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 480.0])
            .with_min_inner_size([640.0, 320.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Storyline",
        options,
        Box::new(|cc| Ok(Box::new(StorylineApp::new(cc, project_path)))),
    )
}
