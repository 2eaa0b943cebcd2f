use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilterOutcome;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Listing rows that pass the current filters, in source order.
pub fn listings_table(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        return;
    };
    let FilterOutcome::Rows(rows) = view.outcome(dataset) else {
        ui.label("No listings match the selected filters.");
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder().at_least(140.0))
        .column(Column::auto().at_least(80.0))
        .header(20.0, |mut header| {
            for title in ["Year", "Odometer", "Condition", "Type", "Model", "Price"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let Some(rec) = rows.get(row.index()) else {
                    return;
                };
                row.col(|ui| {
                    ui.label(format!("{}", rec.model_year));
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", rec.odometer));
                });
                row.col(|ui| {
                    ui.label(rec.condition.label());
                });
                row.col(|ui| {
                    ui.label(&rec.vehicle_type);
                });
                row.col(|ui| {
                    ui.label(&rec.model);
                });
                row.col(|ui| {
                    ui.label(rec.price.map_or_else(|| "—".to_string(), |p| format!("{p:.0}")));
                });
            });
        });
}
