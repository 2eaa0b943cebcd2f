//! Headless summary: run the load → filter → aggregate pipeline once and
//! print the result instead of opening the dashboard.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::data::aggregate::{average_price_by_model, ModelPrice};
use crate::data::filter::{apply, Choice, FilterOutcome, FilterSelection};
use crate::data::model::{CleaningReport, Dataset, YearRange};

#[derive(Debug, Clone, Default, Args)]
pub struct SummaryArgs {
    /// Only listings of this vehicle type.
    #[arg(long = "type")]
    pub vehicle_type: Option<String>,

    /// First model year to include. Defaults to the oldest listing.
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Last model year to include. Defaults to the newest listing.
    #[arg(long)]
    pub year_max: Option<i32>,

    /// Only listings of this model (ignored if the type/year filters leave none).
    #[arg(long)]
    pub model: Option<String>,

    /// Print JSON instead of a text table.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl SummaryArgs {
    /// Turn the flags into a selection over `dataset`, clamping the years.
    pub fn selection(&self, dataset: &Dataset) -> FilterSelection {
        let full = FilterSelection::full(dataset);
        let bounds = dataset.year_bounds.unwrap_or(YearRange::UNBOUNDED);
        FilterSelection {
            type_choice: Choice::from_option(self.vehicle_type.clone()),
            year_range: YearRange::new(
                self.year_min.unwrap_or(full.year_range.start),
                self.year_max.unwrap_or(full.year_range.end),
            )
            .clamped_to(bounds),
            model_choice: Choice::from_option(self.model.clone()),
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    cleaning: &'a CleaningReport,
    unmapped_conditions: &'a BTreeSet<String>,
    selection: &'a FilterSelection,
    matched: usize,
    empty: bool,
    average_price_by_model: Vec<ModelPrice>,
}

/// Write the summary for `args` over `dataset` to `out`.
pub fn write_summary<W: Write>(out: &mut W, dataset: &Dataset, args: &SummaryArgs) -> Result<()> {
    let view = apply(dataset, &args.selection(dataset));
    let averages = match view.outcome(dataset) {
        FilterOutcome::Rows(rows) => average_price_by_model(&rows),
        FilterOutcome::Empty => Vec::new(),
    };

    if args.json {
        let summary = Summary {
            cleaning: &dataset.report,
            unmapped_conditions: &dataset.unmapped_conditions,
            selection: &view.selection,
            matched: view.len(),
            empty: view.is_empty(),
            average_price_by_model: averages,
        };
        serde_json::to_writer_pretty(&mut *out, &summary).context("serializing summary")?;
        writeln!(out)?;
        return Ok(());
    }

    let report = &dataset.report;
    writeln!(
        out,
        "Loaded {} listings (model_year: {} filled, median {}; odometer: {} filled, median {})",
        report.rows,
        report.model_year_filled,
        report.model_year_median,
        report.odometer_filled,
        report.odometer_median
    )?;
    if !dataset.unmapped_conditions.is_empty() {
        let labels: Vec<&str> = dataset.unmapped_conditions.iter().map(String::as_str).collect();
        writeln!(out, "Untranslated conditions: {}", labels.join(", "))?;
    }

    let selection = &view.selection;
    writeln!(
        out,
        "Filters: type={} years={} model={}",
        selection.type_choice, selection.year_range, selection.model_choice
    )?;

    if view.is_empty() {
        writeln!(out, "No data available for the selected filters.")?;
        writeln!(out, "Try adjusting the filters to see results.")?;
        return Ok(());
    }

    writeln!(out, "Matched {} listings", view.len())?;
    writeln!(out)?;
    writeln!(out, "{:<32} {:>12}", "Model", "Avg price")?;
    for m in &averages {
        writeln!(out, "{:<32} {:>12.2}", m.model, m.avg_price)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;

    const CSV: &str = "model_year,odometer,condition,type,model,price\n\
                       2010,1000,good,sedan,X,10000\n\
                       2012,2000,unknown,sedan,X,20000\n\
                       2014,,excellent,truck,Y,15000\n";

    fn dataset() -> Dataset {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        std::fs::write(&path, CSV).unwrap();
        load_file(&path).unwrap()
    }

    fn render(args: &SummaryArgs) -> String {
        let mut out = Vec::new();
        write_summary(&mut out, &dataset(), args).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_summary_lists_models_in_price_order() {
        let text = render(&SummaryArgs::default());
        assert!(text.contains("Untranslated conditions: unknown"));
        assert!(text.contains("Filters: type=All years=2010–2014 model=All"));
        assert!(text.contains("Matched 3 listings"));
        let x = text.find("\nX ").unwrap();
        let y = text.find("\nY ").unwrap();
        assert!(x < y);
    }

    #[test]
    fn empty_selection_prints_hint() {
        let text = render(&SummaryArgs {
            year_min: Some(2011),
            year_max: Some(2011),
            ..SummaryArgs::default()
        });
        assert!(text.contains("No data available for the selected filters."));
        assert!(!text.contains("Matched"));
    }

    #[test]
    fn json_summary_reports_effective_selection() {
        let text = render(&SummaryArgs {
            vehicle_type: Some("truck".into()),
            model: Some("X".into()),
            json: true,
            ..SummaryArgs::default()
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["matched"], 1);
        assert_eq!(value["selection"]["model_choice"], "all");
        assert_eq!(value["selection"]["type_choice"]["only"], "truck");
        assert_eq!(value["average_price_by_model"][0]["model"], "Y");
        assert_eq!(value["cleaning"]["odometer_filled"], 1);
    }

    #[test]
    fn year_flags_are_clamped_to_the_data() {
        let ds = dataset();
        let selection = SummaryArgs {
            year_min: Some(1900),
            ..SummaryArgs::default()
        }
        .selection(&ds);
        assert_eq!(selection.year_range, YearRange::new(2010, 2014));
    }
}
