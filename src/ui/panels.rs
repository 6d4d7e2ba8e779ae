use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::TOP_N_RANGE;
use crate::data::model::TypeKey;
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Type selector ----
            ui.strong("Personality type");
            let mut selected = state.selected_type;
            egui::ComboBox::from_id_salt("type_selector")
                .selected_text(selected.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for key in TypeKey::ALL {
                        ui.selectable_value(&mut selected, key, key.as_str());
                    }
                });
            state.set_type(selected);

            // ---- Top-N slider ----
            ui.add_space(6.0);
            let mut n = state.top_n;
            ui.add(egui::Slider::new(&mut n, TOP_N_RANGE).text("Top N"));
            state.set_top_n(n);

            ui.separator();
            type_summary(ui, state);

            // ---- Country selector (profile view) ----
            ui.separator();
            ui.strong("Country");
            country_selector(ui, state);
        });
}

fn type_summary(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.derived.summary else {
        return;
    };
    ui.label(RichText::new(format!("Global average {}", summary.key)).strong());
    ui.label(RichText::new(format!("{:.2}%", summary.mean)).size(22.0));
    ui.label(format!("Highest: {} ({:.2}%)", summary.max.0, summary.max.1));
    ui.label(format!("Lowest: {} ({:.2}%)", summary.min.0, summary.min.1));
}

fn country_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let current = state.selected_row;
    let current_name = state
        .selected_record()
        .map(|r| r.country.clone())
        .unwrap_or_default();
    let mut picked: Option<usize> = None;
    egui::ComboBox::from_id_salt("country_selector")
        .selected_text(current_name)
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            for (row, record) in ds.records.iter().enumerate() {
                if ui
                    .selectable_label(current == Some(row), &record.country)
                    .clicked()
                {
                    picked = Some(row);
                }
            }
        });
    if let Some(row) = picked {
        state.set_country_row(row);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            ui.selectable_value(&mut state.view, view, view.label());
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{}: {} countries", ds.source, ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open MBTI country data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
