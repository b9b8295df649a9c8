use eframe::egui::{self, Button, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, Pager};

// ---------------------------------------------------------------------------
// Postings table (central panel)
// ---------------------------------------------------------------------------

/// Render the current page of filtered postings.
pub fn postings_table(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading postings…");
        });
        return;
    };

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Live Job Data");
    });

    let total = state.visible_count();
    pager_controls(ui, &mut state.pager, total);
    ui.separator();

    let n_cols = dataset.column_names.len();
    if n_cols == 0 {
        ui.label("The source has no columns.");
        return;
    }
    let page = &state.visible_indices[state.pager.range(total)];

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(120.0).clip(true), n_cols)
            .header(24.0, |mut header| {
                for name in &dataset.column_names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for &idx in page {
                    let posting = &dataset.rows[idx];
                    body.row(20.0, |mut row| {
                        for col in 0..n_cols {
                            row.col(|ui: &mut Ui| {
                                let text = posting
                                    .cells
                                    .get(col)
                                    .map(ToString::to_string)
                                    .unwrap_or_default();
                                ui.label(text);
                            });
                        }
                    });
                }
            });
    });
}

fn pager_controls(ui: &mut Ui, pager: &mut Pager, total: usize) {
    let count = pager.page_count(total);
    ui.horizontal(|ui: &mut Ui| {
        let has_prev = pager.page > 0;
        let has_next = pager.page + 1 < count;

        if ui.add_enabled(has_prev, Button::new("<<")).clicked() {
            pager.page = 0;
        }
        if ui.add_enabled(has_prev, Button::new("<")).clicked() {
            pager.prev();
        }
        ui.label(format!("page {} of {count}", pager.page + 1));
        if ui.add_enabled(has_next, Button::new(">")).clicked() {
            pager.next(total);
        }
        if ui.add_enabled(has_next, Button::new(">>")).clicked() {
            pager.last(total);
        }

        ui.separator();
        ui.label(format!("{total} matching postings"));
    });
}
