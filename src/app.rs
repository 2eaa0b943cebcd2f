use std::path::PathBuf;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VehicleExplorerApp {
    pub state: AppState,
}

impl VehicleExplorerApp {
    /// Start with `data_path` loaded. A failed load leaves the dashboard
    /// showing the error until another file is opened.
    pub fn new(data_path: PathBuf) -> Self {
        let mut state = AppState::default();
        if let Err(e) = state.load_path(&data_path) {
            log::warn!("Starting without data: {e:#}");
        }
        Self { state }
    }
}

impl eframe::App for VehicleExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and chart toggles ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered listings ----
        if self.state.show_table && self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("listings_panel")
                .resizable(true)
                .default_height(220.0)
                .show(ctx, |ui| {
                    table::listings_table(ui, &self.state);
                });
        }

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::chart_panel(ui, &self.state);
        });
    }
}
