use eframe::egui;

use crate::config::Config;
use crate::data::model::JobDataset;
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LiveJobApp {
    pub state: AppState,
}

impl LiveJobApp {
    /// Build the app around an already loaded dataset.
    pub fn new(config: &Config, dataset: JobDataset) -> Self {
        let mut state = AppState::new(
            config.source.clone(),
            config.timeout(),
            usize::from(config.page_size),
        );
        state.set_dataset(dataset);
        Self { state }
    }
}

impl eframe::App for LiveJobApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: paginated table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::postings_table(ui, &mut self.state);
        });
    }
}
