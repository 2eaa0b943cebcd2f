use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, Points};

use crate::color::{teal_scale, ConditionPalette};
use crate::data::aggregate::{
    average_price_by_model, condition_counts, price_vs_odometer, year_histogram, YearBin,
};
use crate::data::filter::{FilterOutcome, FilteredDataset};
use crate::data::model::Condition;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected charts for the current filter view.
pub fn chart_panel(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => ui.heading(RichText::new(msg).color(Color32::RED)),
            None => ui.heading("Open a listings file to explore it  (File → Open…)"),
        });
        return;
    };

    ui.heading("Used vehicle listings");
    ui.label("Pick the charts to show in the side panel.");
    ui.separator();

    let rows = match view.outcome(dataset) {
        FilterOutcome::Empty => {
            ui.label(
                RichText::new("No data available for the selected filters.")
                    .color(Color32::from_rgb(0xFF, 0xB7, 0x4D))
                    .strong(),
            );
            ui.label("Try adjusting the filters to see results.");
            return;
        }
        FilterOutcome::Rows(rows) => rows,
    };

    let fallback;
    let palette = match &state.palette {
        Some(p) => p,
        None => {
            fallback = ConditionPalette::new(&dataset.conditions());
            &fallback
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let toggles = state.toggles;
            if toggles.show_year_histogram {
                section(ui, "Model year distribution by condition");
                year_histogram_chart(ui, &rows, palette);
            }
            if toggles.show_scatter {
                section(ui, "Price vs odometer by condition");
                scatter_chart(ui, &rows, palette);
            }
            if toggles.show_condition_histogram {
                section(ui, "Listings per condition");
                condition_chart(ui, &rows, palette);
            }
            if toggles.show_model_bar {
                section(ui, "Average price by model");
                model_price_chart(ui, &rows);
            }
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.strong(title);
}

/// Axis labels for bar charts whose arguments are category indices.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Per condition, one count per year of `years`, zero where absent.
fn stack_by_condition(bins: &[YearBin]) -> (Vec<i32>, BTreeMap<Condition, Vec<f64>>) {
    let mut years: Vec<i32> = bins.iter().map(|b| b.year).collect();
    years.dedup();

    let mut series: BTreeMap<Condition, Vec<f64>> = BTreeMap::new();
    for bin in bins {
        let Ok(pos) = years.binary_search(&bin.year) else {
            continue;
        };
        series
            .entry(bin.condition.clone())
            .or_insert_with(|| vec![0.0; years.len()])[pos] = bin.count as f64;
    }
    (years, series)
}

fn year_histogram_chart(ui: &mut Ui, rows: &FilteredDataset<'_>, palette: &ConditionPalette) {
    let (years, series) = stack_by_condition(&year_histogram(rows));

    let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
    for (condition, counts) in series {
        let color = palette.color_for(&condition);
        let bars: Vec<Bar> = years
            .iter()
            .zip(counts)
            .map(|(&year, count)| Bar::new(f64::from(year), count).width(0.9).fill(color))
            .collect();
        let chart = {
            let below: Vec<&BarChart> = charts.iter().collect();
            BarChart::new(bars)
                .name(condition.label())
                .color(color)
                .stack_on(&below)
        };
        charts.push(chart);
    }

    Plot::new("year_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Model year")
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn scatter_chart(ui: &mut Ui, rows: &FilteredDataset<'_>, palette: &ConditionPalette) {
    let mut by_condition: BTreeMap<Condition, Vec<[f64; 2]>> = BTreeMap::new();
    for point in price_vs_odometer(rows) {
        by_condition
            .entry(point.condition)
            .or_default()
            .push([point.odometer, point.price]);
    }

    Plot::new("price_vs_odometer")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Odometer")
        .y_axis_label("Price ($)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (condition, points) in by_condition {
                plot_ui.points(
                    Points::new(points)
                        .name(condition.label())
                        .color(palette.color_for(&condition).gamma_multiply(0.7))
                        .radius(2.0),
                );
            }
        });
}

fn condition_chart(ui: &mut Ui, rows: &FilteredDataset<'_>, palette: &ConditionPalette) {
    let counts = condition_counts(rows);
    let labels: Vec<String> = counts.iter().map(|(c, _)| c.to_string()).collect();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (condition, count))| {
            Bar::new(i as f64, *count as f64)
                .width(0.8)
                .name(condition.label())
                .fill(palette.color_for(condition))
        })
        .collect();

    Plot::new("condition_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Condition")
        .y_axis_label("Count")
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

fn model_price_chart(ui: &mut Ui, rows: &FilteredDataset<'_>) {
    let averages = average_price_by_model(rows);
    let (min, max) = averages
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
            (lo.min(m.avg_price), hi.max(m.avg_price))
        });

    let labels: Vec<String> = averages.iter().map(|m| m.model.clone()).collect();
    let bars: Vec<Bar> = averages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64, m.avg_price)
                .width(0.8)
                .name(&m.model)
                .fill(teal_scale(m.avg_price, min, max))
        })
        .collect();

    if bars.is_empty() {
        ui.label("No priced listings in the current selection.");
        return;
    }

    Plot::new("model_price_bar")
        .height(CHART_HEIGHT)
        .x_axis_label("Model")
        .y_axis_label("Average price ($)")
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_align_on_shared_years() {
        let bins = vec![
            YearBin { year: 2010, condition: Condition::Excelente, count: 2 },
            YearBin { year: 2010, condition: Condition::Bueno, count: 1 },
            YearBin { year: 2012, condition: Condition::Bueno, count: 4 },
        ];
        let (years, series) = stack_by_condition(&bins);
        assert_eq!(years, [2010, 2012]);
        assert_eq!(series[&Condition::Excelente], [2.0, 0.0]);
        assert_eq!(series[&Condition::Bueno], [1.0, 4.0]);
    }

    #[test]
    fn category_axis_labels_whole_positions_only() {
        let format = category_axis(vec!["nuevo".into(), "bueno".into()]);
        let mark = |value| GridMark { value, step_size: 1.0 };
        assert_eq!(format(mark(1.0), &(0.0..=1.0)), "bueno");
        assert_eq!(format(mark(0.5), &(0.0..=1.0)), "");
        assert_eq!(format(mark(7.0), &(0.0..=1.0)), "");
    }
}
