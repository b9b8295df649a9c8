use anyhow::{Context, Result, anyhow};
use clap::Parser;
use eframe::egui;
use livejob_viewer::app::LiveJobApp;
use livejob_viewer::config::Config;
use livejob_viewer::data::loader::load_source;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::parse();

    // The table is useless without data: a failed initial load ends the
    // process with the full cause chain.
    log::info!("loading postings from {}", config.source);
    let dataset = load_source(&config.source, config.timeout())
        .with_context(|| format!("loading postings from {}", config.source))?;
    log::info!(
        "Loaded {} postings with columns {:?}",
        dataset.len(),
        dataset.column_names
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Live Job Data",
        options,
        Box::new(move |_cc| Ok(Box::new(LiveJobApp::new(&config, dataset)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}
