use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::filter::FilteredDataset;
use super::model::Condition;

// ---------------------------------------------------------------------------
// Average price per model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPrice {
    pub model: String,
    pub avg_price: f64,
}

/// Mean price per model, highest first. Ties keep the order in which the
/// models were first encountered. Records without a price are skipped and a
/// model with no priced record is omitted.
pub fn average_price_by_model(filtered: &FilteredDataset<'_>) -> Vec<ModelPrice> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for rec in filtered.records() {
        let Some(price) = rec.price else { continue };
        let slot = *slots.entry(rec.model.as_str()).or_insert_with(|| {
            groups.push((rec.model.as_str(), 0.0, 0));
            groups.len() - 1
        });
        let (_, sum, count) = &mut groups[slot];
        *sum += price;
        *count += 1;
    }

    let mut averages: Vec<ModelPrice> = groups
        .into_iter()
        .map(|(model, sum, count)| ModelPrice {
            model: model.to_string(),
            avg_price: sum / count as f64,
        })
        .collect();
    // `sort_by` is stable, so equal averages stay in encounter order.
    averages.sort_by(|a, b| b.avg_price.total_cmp(&a.avg_price));
    averages
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Listing count for one (whole model year, condition) bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearBin {
    pub year: i32,
    pub condition: Condition,
    pub count: usize,
}

/// Listings per whole model year and condition, years ascending, conditions
/// in canonical order.
///
/// Fractional (imputed) years fall into the bin of their floor, while the
/// year filter compares the exact value. A listing imputed to 2011.5 is
/// counted under 2011 but is only kept by a range that reaches 2012.
pub fn year_histogram(filtered: &FilteredDataset<'_>) -> Vec<YearBin> {
    let mut bins: BTreeMap<(i32, &Condition), usize> = BTreeMap::new();
    for rec in filtered.records() {
        *bins
            .entry((rec.model_year.floor() as i32, &rec.condition))
            .or_default() += 1;
    }
    bins.into_iter()
        .map(|((year, condition), count)| YearBin {
            year,
            condition: condition.clone(),
            count,
        })
        .collect()
}

/// Listings per condition in canonical order.
pub fn condition_counts(filtered: &FilteredDataset<'_>) -> Vec<(Condition, usize)> {
    let mut counts: BTreeMap<&Condition, usize> = BTreeMap::new();
    for rec in filtered.records() {
        *counts.entry(&rec.condition).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(condition, count)| (condition.clone(), count))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub odometer: f64,
    pub price: f64,
    pub condition: Condition,
}

/// Odometer against price for every priced listing.
pub fn price_vs_odometer(filtered: &FilteredDataset<'_>) -> Vec<ScatterPoint> {
    filtered
        .records()
        .filter_map(|rec| {
            Some(ScatterPoint {
                odometer: rec.odometer,
                price: rec.price?,
                condition: rec.condition.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterOutcome, FilterSelection};
    use crate::data::model::{CleaningReport, Dataset, Record, YearRange};

    fn record(model: &str, price: Option<f64>, year: f64, condition: Condition) -> Record {
        Record {
            model_year: year,
            odometer: 1000.0,
            condition,
            vehicle_type: "sedan".to_string(),
            model: model.to_string(),
            price,
        }
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        let rows = records.len();
        Dataset::from_records(
            records,
            CleaningReport {
                rows,
                model_year_median: 0.0,
                odometer_median: 0.0,
                model_year_filled: 0,
                odometer_filled: 0,
                unparseable_cells: 0,
            },
        )
    }

    /// Run `f` over the identity filter of `ds`.
    fn with_rows<T>(ds: &Dataset, f: impl FnOnce(&FilteredDataset<'_>) -> T) -> T {
        let view = apply(ds, &FilterSelection::full(ds));
        match view.outcome(ds) {
            FilterOutcome::Rows(rows) => f(&rows),
            FilterOutcome::Empty => panic!("expected rows"),
        }
    }

    #[test]
    fn ties_keep_encounter_order() {
        let ds = dataset(vec![
            record("X", Some(10_000.0), 2010.0, Condition::Bueno),
            record("X", Some(20_000.0), 2010.0, Condition::Bueno),
            record("Y", Some(15_000.0), 2010.0, Condition::Bueno),
        ]);
        let averages = with_rows(&ds, average_price_by_model);
        assert_eq!(
            averages,
            [
                ModelPrice { model: "X".into(), avg_price: 15_000.0 },
                ModelPrice { model: "Y".into(), avg_price: 15_000.0 },
            ]
        );
    }

    #[test]
    fn averages_sorted_descending() {
        let ds = dataset(vec![
            record("kia soul", Some(4_000.0), 2012.0, Condition::Justo),
            record("ram 1500", Some(20_000.0), 2015.0, Condition::Bueno),
            record("kia soul", Some(6_000.0), 2013.0, Condition::Bueno),
            record("bmw x5", Some(12_000.0), 2011.0, Condition::Excelente),
            record("bmw x5", None, 2011.0, Condition::Excelente),
            record("jeep wrangler", None, 2016.0, Condition::Nuevo),
        ]);
        let averages = with_rows(&ds, average_price_by_model);
        let models: Vec<&str> = averages.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(models, ["ram 1500", "bmw x5", "kia soul"]);
        assert_eq!(averages[2].avg_price, 5_000.0);
    }

    #[test]
    fn year_histogram_bins_by_year_then_condition() {
        let ds = dataset(vec![
            record("a", Some(1.0), 2012.0, Condition::Bueno),
            record("a", Some(1.0), 2011.5, Condition::Excelente),
            record("a", Some(1.0), 2011.0, Condition::Bueno),
            record("a", Some(1.0), 2011.0, Condition::Excelente),
        ]);
        let bins = with_rows(&ds, year_histogram);
        assert_eq!(
            bins,
            [
                YearBin { year: 2011, condition: Condition::Excelente, count: 2 },
                YearBin { year: 2011, condition: Condition::Bueno, count: 1 },
                YearBin { year: 2012, condition: Condition::Bueno, count: 1 },
            ]
        );
    }

    #[test]
    fn fractional_year_bins_by_floor_but_filters_exactly() {
        let ds = dataset(vec![
            record("a", Some(1.0), 2011.0, Condition::Bueno),
            record("a", Some(1.0), 2011.5, Condition::Bueno),
            record("a", Some(1.0), 2012.0, Condition::Bueno),
        ]);
        let bins = with_rows(&ds, year_histogram);
        assert_eq!(bins[0], YearBin { year: 2011, condition: Condition::Bueno, count: 2 });

        let only_2011 = FilterSelection {
            year_range: YearRange::new(2011, 2011),
            ..FilterSelection::full(&ds)
        };
        assert_eq!(apply(&ds, &only_2011).indices, [0]);

        let through_2012 = FilterSelection {
            year_range: YearRange::new(2011, 2012),
            ..FilterSelection::full(&ds)
        };
        assert_eq!(apply(&ds, &through_2012).indices, [0, 1, 2]);
    }

    #[test]
    fn condition_counts_in_canonical_order() {
        let ds = dataset(vec![
            record("a", Some(1.0), 2012.0, Condition::Other("unknown".into())),
            record("a", Some(1.0), 2012.0, Condition::Rescatado),
            record("a", Some(1.0), 2012.0, Condition::Nuevo),
            record("a", Some(1.0), 2012.0, Condition::Rescatado),
        ]);
        let counts = with_rows(&ds, condition_counts);
        assert_eq!(
            counts,
            [
                (Condition::Nuevo, 1),
                (Condition::Rescatado, 2),
                (Condition::Other("unknown".into()), 1),
            ]
        );
    }

    #[test]
    fn scatter_skips_unpriced_listings() {
        let ds = dataset(vec![
            record("a", Some(3_000.0), 2012.0, Condition::Bueno),
            record("b", None, 2012.0, Condition::Bueno),
        ]);
        let points = with_rows(&ds, price_vs_odometer);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 3_000.0);
    }
}
