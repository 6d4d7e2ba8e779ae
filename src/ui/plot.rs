use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, FontId, ProgressBar, RichText, Sense, Stroke, Ui, Vec2, pos2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridInput, GridMark, Plot, uniform_grid_spacer};

use crate::color::{HeatScale, generate_palette, type_color};
use crate::data::aggregate::{dichotomy_shares, dominant_type};
use crate::data::model::{Dataset, TypeKey};
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

/// Render the active view in the central panel.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) if !ds.is_empty() => ds,
        _ => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(
                    "Open a CSV file to view the dashboard  (File → Open… or drop it here)",
                );
            });
            return;
        }
    };

    match state.view {
        View::TopCountries => top_countries_chart(ui, state),
        View::GlobalRanking => ranking_chart(ui, state),
        View::Heatmap => variance_heatmap(ui, state, dataset),
        View::CountryProfile => country_profile(ui, state, dataset),
        View::Table => data_table(ui, dataset),
    }
}

// ---------------------------------------------------------------------------
// Category axes
// ---------------------------------------------------------------------------

/// Label for a grid mark sitting on an integer bar position.
fn category_label(labels: &[String], mark: GridMark) -> String {
    let v = mark.value;
    if v < 0.0 || (v - v.round()).abs() > 1e-6 {
        return String::new();
    }
    labels.get(v.round() as usize).cloned().unwrap_or_default()
}

/// One grid line per bar.
fn unit_spacer(input: GridInput) -> Vec<GridMark> {
    uniform_grid_spacer(|_| [1.0, 5.0, 10.0])(input)
}

// ---------------------------------------------------------------------------
// Top-N countries for the selected type
// ---------------------------------------------------------------------------

fn top_countries_chart(ui: &mut Ui, state: &AppState) {
    let rows = &state.derived.top_countries;
    let key = state.selected_type;
    ui.heading(format!("Top {} countries by {key}", rows.len()));

    // Horizontal bars, highest share on top.
    let n = rows.len();
    let labels: Vec<String> = rows.iter().rev().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, (country, pct))| {
            Bar::new((n - 1 - i) as f64, *pct)
                .name(country)
                .fill(type_color(key))
                .width(0.7)
        })
        .collect();

    Plot::new("top_countries")
        .x_axis_label("Percent")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark)
        })
        .y_grid_spacer(unit_spacer)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(key.as_str()).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Global ranking of the 16 types
// ---------------------------------------------------------------------------

fn ranking_chart(ui: &mut Ui, state: &AppState) {
    let ranking = &state.derived.ranking;
    ui.heading("Average share of each type across all countries");

    let labels: Vec<String> = ranking.iter().map(|(k, _)| k.to_string()).collect();
    let bars: Vec<Bar> = ranking
        .iter()
        .enumerate()
        .map(|(i, (key, pct))| {
            Bar::new(i as f64, *pct)
                .name(key.as_str())
                .fill(type_color(*key))
                .width(0.7)
        })
        .collect();

    Plot::new("global_ranking")
        .y_axis_label("Percent")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark)
        })
        .x_grid_spacer(unit_spacer)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Global average"));
        });
}

// ---------------------------------------------------------------------------
// Heatmap of the most uneven countries
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 140.0;
const CELL_HEIGHT: f32 = 22.0;

fn variance_heatmap(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    let rows = &state.derived.high_variance;
    ui.heading(format!(
        "{} countries with the most uneven type distribution (%)",
        rows.len()
    ));

    let scale = HeatScale::spanning(
        rows.iter()
            .flat_map(|r| dataset.records[r.row].values.iter().map(|v| v * 100.0)),
    );

    let cell_width = ((ui.available_width() - LABEL_WIDTH) / TypeKey::COUNT as f32).max(30.0);
    let size = Vec2::new(
        LABEL_WIDTH + cell_width * TypeKey::COUNT as f32,
        CELL_HEIGHT * (rows.len() + 1) as f32,
    );

    egui::ScrollArea::both().show(ui, |ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let origin = response.rect.min;
        let text_color = ui.visuals().text_color();
        let font = FontId::proportional(11.0);
        let cell_rect = |row: usize, col: usize| {
            egui::Rect::from_min_size(
                pos2(
                    origin.x + LABEL_WIDTH + col as f32 * cell_width,
                    origin.y + (row + 1) as f32 * CELL_HEIGHT,
                ),
                Vec2::new(cell_width, CELL_HEIGHT),
            )
        };

        // Column headers
        for key in TypeKey::ALL {
            let rect = cell_rect(0, key.index()).translate(Vec2::new(0.0, -CELL_HEIGHT));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                key.as_str(),
                font.clone(),
                text_color,
            );
        }

        let mut hovered: Option<String> = None;
        for (row, entry) in rows.iter().enumerate() {
            let record = &dataset.records[entry.row];
            let label_pos = pos2(origin.x + LABEL_WIDTH - 6.0, cell_rect(row, 0).center().y);
            painter.text(
                label_pos,
                Align2::RIGHT_CENTER,
                &record.country,
                font.clone(),
                text_color,
            );

            for key in TypeKey::ALL {
                let pct = record.percent(key);
                let rect = cell_rect(row, key.index());
                painter.rect_filled(rect.shrink(0.5), 0.0, scale.color_for(pct));
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{pct:.1}"),
                    font.clone(),
                    scale.text_color_for(pct),
                );
                if response.hover_pos().is_some_and(|p| rect.contains(p)) {
                    painter.rect_stroke(
                        rect,
                        0.0,
                        Stroke::new(1.5, text_color),
                        egui::StrokeKind::Inside,
                    );
                    hovered = Some(format!(
                        "{} · {key}: {pct:.2}%\nvariance {:.5}",
                        record.country, entry.variance
                    ));
                }
            }
        }

        if let Some(text) = hovered {
            response.on_hover_text(text);
        }
    });
}

// ---------------------------------------------------------------------------
// One country's distribution
// ---------------------------------------------------------------------------

fn country_profile(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    let selected = state.selected_row.and_then(|row| dataset.records.get(row));
    let (Some(record), Some(profile)) = (selected, &state.derived.profile) else {
        ui.label("Select a country in the side panel.");
        return;
    };
    let country = &record.country;

    ui.horizontal(|ui: &mut Ui| {
        ui.heading(country);
        ui.label(RichText::new(format!("dominant type: {}", dominant_type(record))).italics());
    });

    // Letter axes
    let colors = generate_palette(4);
    for (share, color) in dichotomy_shares(record).iter().zip(colors) {
        let (first, second) = share.axis.poles();
        let total = share.first + share.second;
        let frac = if total > 0.0 { share.first / total } else { 0.0 };
        ui.add(
            ProgressBar::new(frac as f32)
                .fill(color)
                .desired_width(360.0)
                .text(format!(
                    "{first} {:.1}%  ·  {second} {:.1}%",
                    share.first, share.second
                )),
        );
    }
    ui.add_space(8.0);

    let labels: Vec<String> = profile.iter().map(|(k, _)| k.to_string()).collect();
    let bars: Vec<Bar> = profile
        .iter()
        .enumerate()
        .map(|(i, (key, pct))| {
            Bar::new(i as f64, *pct)
                .name(key.as_str())
                .fill(type_color(*key))
                .width(0.7)
        })
        .collect();

    Plot::new("country_profile")
        .y_axis_label("Percent")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark)
        })
        .x_grid_spacer(unit_spacer)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(country.as_str()));
        });
}

// ---------------------------------------------------------------------------
// Raw table
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, dataset: &Dataset) {
    ui.heading(format!("{} ({} rows, %)", dataset.source, dataset.len()));

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::initial(150.0).resizable(true))
            .column(Column::initial(70.0))
            .columns(Column::initial(56.0), TypeKey::COUNT)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Country");
                });
                header.col(|ui| {
                    ui.strong("Dominant");
                });
                for key in TypeKey::ALL {
                    header.col(|ui| {
                        ui.strong(key.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, dataset.len(), |mut row| {
                    let record = &dataset.records[row.index()];
                    row.col(|ui| {
                        ui.label(&record.country);
                    });
                    row.col(|ui| {
                        ui.label(dominant_type(record).as_str());
                    });
                    for key in TypeKey::ALL {
                        row.col(|ui| {
                            ui.label(format!("{:.2}", record.percent(key)));
                        });
                    }
                });
            });
    });
}
