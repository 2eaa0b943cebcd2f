use super::error::DataError;
use super::model::{CleaningReport, Condition, Dataset, Record};

/// Label used for empty categorical cells.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Largest model year that fits the integer year bounds.
const MAX_MODEL_YEAR: f64 = i32::MAX as f64;

// ---------------------------------------------------------------------------
// RawListing – one parsed row before cleaning
// ---------------------------------------------------------------------------

/// A row as produced by the format readers: numeric cells already coerced
/// (`None` for missing or unparseable), categorical cells still raw.
#[derive(Debug, Clone, PartialEq)]
pub struct RawListing {
    pub model_year: Option<f64>,
    pub odometer: Option<f64>,
    pub condition: String,
    pub vehicle_type: String,
    pub model: String,
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Tallies numeric cells that were present but not coercible.
#[derive(Debug, Default)]
pub struct Coercion {
    pub unparseable: usize,
}

impl Coercion {
    /// Coerce a text cell to a non-negative finite number. Empty cells are
    /// missing; anything else that fails is missing and counted.
    pub fn number(&mut self, cell: Option<&str>) -> Option<f64> {
        let text = cell.map(str::trim).filter(|s| !s.is_empty())?;
        let value = text.parse::<f64>().ok();
        self.accept(value)
    }

    /// Validate an already-numeric cell.
    pub fn accept(&mut self, value: Option<f64>) -> Option<f64> {
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => Some(v),
            _ => {
                self.unparseable += 1;
                None
            }
        }
    }
}

/// Normalise a categorical cell: trimmed, `unknown` when empty.
pub fn category(cell: Option<&str>) -> String {
    match cell.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Condition translation
// ---------------------------------------------------------------------------

/// Translate a source condition label. Unmapped labels pass through.
pub fn translate_condition(raw: &str) -> Condition {
    match raw.trim() {
        "new" => Condition::Nuevo,
        "like new" => Condition::CasiNuevo,
        "excellent" => Condition::Excelente,
        "good" => Condition::Bueno,
        "fair" => Condition::Justo,
        "salvage" => Condition::Rescatado,
        other => Condition::Other(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Median imputation
// ---------------------------------------------------------------------------

/// Median of the present values: the middle value for odd counts, the mean
/// of the two central values for even counts. `None` when nothing is present.
pub fn median(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 1 {
        Some(present[mid])
    } else {
        Some((present[mid - 1] + present[mid]) / 2.0)
    }
}

/// Impute missing numerics, translate conditions and index the result.
pub fn clean(mut raw: Vec<RawListing>, mut unparseable_cells: usize) -> Result<Dataset, DataError> {
    for r in &mut raw {
        if r.model_year.is_some_and(|y| y > MAX_MODEL_YEAR) {
            r.model_year = None;
            unparseable_cells += 1;
        }
    }

    let model_year_median = median(raw.iter().map(|r| r.model_year))
        .ok_or(DataError::EmptyColumn { column: "model_year" })?;
    let odometer_median = median(raw.iter().map(|r| r.odometer))
        .ok_or(DataError::EmptyColumn { column: "odometer" })?;

    let mut model_year_filled = 0;
    let mut odometer_filled = 0;
    let rows = raw.len();

    let records: Vec<Record> = raw
        .into_iter()
        .map(|r| {
            let model_year = r.model_year.unwrap_or_else(|| {
                model_year_filled += 1;
                model_year_median
            });
            let odometer = r.odometer.unwrap_or_else(|| {
                odometer_filled += 1;
                odometer_median
            });
            Record {
                model_year,
                odometer,
                condition: translate_condition(&r.condition),
                vehicle_type: r.vehicle_type,
                model: r.model,
                price: r.price,
            }
        })
        .collect();

    let dataset = Dataset::from_records(
        records,
        CleaningReport {
            rows,
            model_year_median,
            odometer_median,
            model_year_filled,
            odometer_filled,
            unparseable_cells,
        },
    );

    log::info!(
        "Cleaned {rows} listings: filled {model_year_filled} model years (median {model_year_median}), \
         {odometer_filled} odometer readings (median {odometer_median})"
    );
    if unparseable_cells > 0 {
        log::warn!("{unparseable_cells} numeric cells could not be parsed and were treated as missing");
    }
    if !dataset.unmapped_conditions.is_empty() {
        log::warn!(
            "Condition labels without translation: {:?}",
            dataset.unmapped_conditions
        );
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::YearRange;

    fn raw(year: Option<f64>, odometer: Option<f64>, condition: &str) -> RawListing {
        RawListing {
            model_year: year,
            odometer,
            condition: condition.to_string(),
            vehicle_type: "sedan".to_string(),
            model: "honda civic".to_string(),
            price: Some(5000.0),
        }
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median([Some(3.0), Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median([Some(4.0), None, Some(1.0), Some(2.0), Some(3.0)]), Some(2.5));
        assert_eq!(median([None, None]), None);
    }

    #[test]
    fn fills_missing_values_with_column_median() {
        let ds = clean(
            vec![
                raw(Some(2010.0), Some(100.0), "good"),
                raw(None, Some(300.0), "good"),
                raw(Some(2014.0), None, "good"),
                raw(Some(2012.0), Some(200.0), "good"),
            ],
            0,
        )
        .unwrap();

        assert_eq!(ds.records[1].model_year, 2012.0);
        assert_eq!(ds.records[2].odometer, 200.0);
        assert_eq!(ds.report.model_year_filled, 1);
        assert_eq!(ds.report.odometer_filled, 1);
        assert!(ds.records.iter().all(|r| r.model_year.is_finite() && r.odometer.is_finite()));
    }

    #[test]
    fn constant_column_fills_with_the_constant() {
        let ds = clean(
            vec![
                raw(Some(2015.0), Some(1.0), "good"),
                raw(None, Some(1.0), "good"),
                raw(Some(2015.0), Some(1.0), "good"),
            ],
            0,
        )
        .unwrap();
        assert_eq!(ds.records[1].model_year, 2015.0);
    }

    #[test]
    fn all_missing_column_is_an_error() {
        let err = clean(vec![raw(Some(2015.0), None, "good")], 0).unwrap_err();
        assert!(matches!(err, DataError::EmptyColumn { column: "odometer" }));

        let err = clean(Vec::new(), 0).unwrap_err();
        assert!(matches!(err, DataError::EmptyColumn { column: "model_year" }));
    }

    #[test]
    fn translates_known_labels_and_passes_others_through() {
        assert_eq!(translate_condition("excellent"), Condition::Excelente);
        assert_eq!(translate_condition("like new"), Condition::CasiNuevo);
        assert_eq!(translate_condition(" salvage "), Condition::Rescatado);
        assert_eq!(
            translate_condition("unknown"),
            Condition::Other("unknown".to_string())
        );
    }

    #[test]
    fn coercion_counts_garbage_but_not_blanks() {
        let mut c = Coercion::default();
        assert_eq!(c.number(Some("2011.0")), Some(2011.0));
        assert_eq!(c.number(Some("  ")), None);
        assert_eq!(c.number(None), None);
        assert_eq!(c.number(Some("n/a")), None);
        assert_eq!(c.number(Some("-5")), None);
        assert_eq!(c.unparseable, 2);
    }

    #[test]
    fn out_of_range_year_is_unparseable() {
        use crate::data::filter::{apply, FilterSelection};

        let ds = clean(
            vec![raw(Some(2010.0), Some(1.0), "good"), raw(Some(3e9), Some(1.0), "good")],
            0,
        )
        .unwrap();

        assert_eq!(ds.report.unparseable_cells, 1);
        assert_eq!(ds.report.model_year_filled, 1);
        assert_eq!(ds.records[1].model_year, 2010.0);
        assert_eq!(ds.year_bounds, Some(YearRange::new(2010, 2010)));

        let view = apply(&ds, &FilterSelection::full(&ds));
        assert_eq!(view.indices, [0, 1]);
    }

    #[test]
    fn empty_category_becomes_unknown() {
        assert_eq!(category(Some("  pickup ")), "pickup");
        assert_eq!(category(Some("")), UNKNOWN_LABEL);
        assert_eq!(category(None), UNKNOWN_LABEL);
    }
}
