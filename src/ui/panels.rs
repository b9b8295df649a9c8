use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, TextEdit, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::InvalidCriteriaError;
use crate::data::loader::DataSource;
use crate::data::model::Language;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if !state.is_ready() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Loading postings…");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- JP_ID / JobTitle ----
            ui.strong("Filter by Job ID or JobTitle");
            ui.add(
                TextEdit::singleline(&mut state.criteria.text_or_id)
                    .hint_text("Enter JP_ID or JobTitle...")
                    .desired_width(f32::INFINITY),
            );
            ui.separator();

            // ---- Publish date ----
            ui.strong("Filter by Publish Date");
            match state.criteria.date_range.as_mut() {
                Some(range) => {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.add(DatePickerButton::new(&mut range.start).id_salt("publish_start"));
                        ui.label("to");
                        ui.add(DatePickerButton::new(&mut range.end).id_salt("publish_end"));
                    });
                }
                None => {
                    ui.weak("No publish dates in data");
                }
            }
            if matches!(state.criteria_error, Some(InvalidCriteriaError::DateRange { .. })) {
                invalid_range_label(ui);
            }
            ui.separator();

            // ---- CP_ID multi-select ----
            let header = format!(
                "Filter by CP ID  ({}/{})",
                state.criteria.cp_ids.len(),
                state.options.cp_ids.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("cp_ids")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.criteria.cp_ids.clear();
                    }
                    for id in state.options.cp_ids.clone() {
                        let mut checked = state.criteria.cp_ids.contains(&id);
                        if ui.checkbox(&mut checked, id.to_string()).changed() {
                            state.toggle_cp_id(&id);
                        }
                    }
                });
            ui.separator();

            // ---- Regional job range ----
            ui.strong("Filter by Regional JOB");
            match (
                state.criteria.regional_job_range.as_mut(),
                state.options.regional_job_bounds,
            ) {
                (Some(range), Some((lo, hi))) => {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("min");
                        ui.add(DragValue::new(&mut range.start).range(lo..=hi));
                        ui.label("max");
                        ui.add(DragValue::new(&mut range.end).range(lo..=hi));
                    });
                }
                _ => {
                    ui.weak("No regional job values in data");
                }
            }
            if matches!(
                state.criteria_error,
                Some(InvalidCriteriaError::RegionalJobRange { .. })
            ) {
                invalid_range_label(ui);
            }
            ui.separator();

            // ---- Category multi-select ----
            let header = format!(
                "Filter by Category  ({}/{})",
                state.criteria.category_names.len(),
                state.options.categories.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("categories")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.criteria.category_names.clear();
                    }
                    for name in state.options.categories.clone() {
                        let mut checked = state.criteria.category_names.contains(&name);
                        if ui.checkbox(&mut checked, name.as_str()).changed() {
                            state.toggle_category(&name);
                        }
                    }
                });
            ui.separator();

            // ---- Language ----
            ui.strong("Filter by Language");
            for lang in Language::ALL {
                let mut checked = state.criteria.languages.contains(&lang);
                if ui.checkbox(&mut checked, lang.label()).changed() {
                    state.set_language(lang, checked);
                }
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    // Recompute visible rows if any control changed this frame.
    state.refilter();
}

fn invalid_range_label(ui: &mut Ui) {
    ui.label(RichText::new("Invalid range: start is after end").color(Color32::RED));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, ui.ctx());
                ui.close_menu();
            }
            if ui.button("Reload source").clicked() {
                let source = state.source.clone();
                state.start_load(source, Some(ui.ctx().clone()));
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} postings loaded, {} visible",
                ds.len(),
                state.visible_count()
            ));
        }

        if state.loader.is_loading() {
            ui.separator();
            ui.spinner();
            ui.label("Loading…");
        }

        if let Some(err) = &state.criteria_error {
            ui.separator();
            ui.label(RichText::new(format!("Filter ignored: {err}")).color(Color32::RED));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, ctx: &egui::Context) {
    let file = rfd::FileDialog::new()
        .set_title("Open job postings")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.start_load(DataSource::File(path), Some(ctx.clone()));
    }
}
