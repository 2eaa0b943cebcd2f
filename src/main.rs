mod app;
mod color;
mod data;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::VehicleExplorerApp;
use clap::{Parser, Subcommand};
use eframe::egui;

use crate::data::loader::load_file;
use crate::report::SummaryArgs;

#[derive(Parser)]
#[command(
    name = "vehicle-explorer",
    about = "Explore used-vehicle listings: filter by type, year and model, chart the result"
)]
struct Cli {
    /// Listings file (.csv, .json or .parquet).
    #[arg(long, global = true, default_value = "vehicles_us.csv")]
    data: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cleaning report and average price per model, no window.
    Summary(SummaryArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Summary(args)) => {
            let dataset = load_file(&cli.data)
                .with_context(|| format!("loading {}", cli.data.display()))?;
            let mut stdout = std::io::stdout().lock();
            report::write_summary(&mut stdout, &dataset, &args)
        }
        None => run_dashboard(cli.data),
    }
}

fn run_dashboard(data_path: PathBuf) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vehicle Explorer – Used Listings",
        options,
        Box::new(move |_cc| Ok(Box::new(VehicleExplorerApp::new(data_path)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
