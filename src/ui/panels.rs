use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Choice;
use crate::data::model::YearRange;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the widgets.
    let (Some(dataset), Some(selection), Some(view)) = (
        state.dataset.clone(),
        state.selection.clone(),
        state.view.clone(),
    ) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Vehicle type ----
            ui.strong("Vehicle type");
            if let Some(choice) =
                choice_combo(ui, "type_choice", &selection.type_choice, &dataset.types)
            {
                state.set_type_choice(choice);
            }
            ui.add_space(6.0);

            // ---- Model year range ----
            if let Some(bounds) = dataset.year_bounds {
                ui.strong("Model year");
                let mut start = selection.year_range.start;
                let mut end = selection.year_range.end;
                let from = ui.add(egui::Slider::new(&mut start, bounds.start..=bounds.end).text("from"));
                let to = ui.add(egui::Slider::new(&mut end, bounds.start..=bounds.end).text("to"));
                if from.changed() || to.changed() {
                    state.set_year_range(YearRange::new(start, end));
                }
                ui.add_space(6.0);
            }

            // ---- Model (options depend on type + year) ----
            ui.strong("Model");
            if let Some(choice) = choice_combo(
                ui,
                "model_choice",
                &view.selection.model_choice,
                &view.model_options,
            ) {
                state.set_model_choice(choice);
            }
            ui.add_space(6.0);

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
            ui.separator();

            // ---- Chart toggles ----
            ui.strong("Charts");
            let toggles = &mut state.toggles;
            ui.checkbox(&mut toggles.show_year_histogram, "Model year histogram");
            ui.checkbox(&mut toggles.show_scatter, "Price vs odometer");
            ui.checkbox(&mut toggles.show_condition_histogram, "Condition histogram");
            ui.checkbox(&mut toggles.show_model_bar, "Average price by model");
            ui.checkbox(&mut state.show_table, "Listings table");
            ui.separator();

            // ---- Condition legend ----
            if let Some(palette) = &state.palette {
                egui::CollapsingHeader::new(RichText::new("Condition colours").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        for (label, color) in palette.legend_entries() {
                            ui.label(RichText::new(format!("■ {label}")).color(color));
                        }
                    });
            }

            // ---- Cleaning summary ----
            egui::CollapsingHeader::new(RichText::new("Data cleaning").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    let report = &dataset.report;
                    ui.label(format!("{} rows", report.rows));
                    ui.label(format!(
                        "model_year: {} filled with median {}",
                        report.model_year_filled, report.model_year_median
                    ));
                    ui.label(format!(
                        "odometer: {} filled with median {}",
                        report.odometer_filled, report.odometer_median
                    ));
                    if report.unparseable_cells > 0 {
                        ui.label(format!(
                            "{} unparseable numeric cells",
                            report.unparseable_cells
                        ));
                    }
                    for label in &dataset.unmapped_conditions {
                        ui.label(
                            RichText::new(format!("untranslated condition: {label}"))
                                .color(Color32::from_rgb(0xFF, 0x8A, 0x65)),
                        );
                    }
                });
        });
}

/// A combo box offering "All" plus `options`. Returns the new choice when
/// the user picked a different one.
fn choice_combo(ui: &mut Ui, id: &str, current: &Choice, options: &[String]) -> Option<Choice> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_all(), "All").clicked() && !current.is_all() {
                picked = Some(Choice::All);
            }
            for option in options {
                let selected = matches!(current, Choice::Only(o) if o == option);
                if ui.selectable_label(selected, option).clicked() && !selected {
                    picked = Some(Choice::Only(option.clone()));
                }
            }
        });
    picked
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
            let reload_target = state.data_path.clone();
            if ui
                .add_enabled(reload_target.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Some(path) = reload_target {
                    state.cache.invalidate();
                    // Failures are reported through `status_message`.
                    let _ = state.load_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} listings loaded, {} match the filters",
                ds.len(),
                view.len()
            ));
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

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Failures are reported through `status_message`.
        let _ = state.load_path(&path);
    }
}
