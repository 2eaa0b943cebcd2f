use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Condition – translated condition label
// ---------------------------------------------------------------------------

/// Condition of a listing after label translation.
///
/// The derived `Ord` is the canonical category order: the six known labels
/// first, in the order below, then untranslated labels lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    Nuevo,
    CasiNuevo,
    Excelente,
    Bueno,
    Justo,
    Rescatado,
    /// A source label with no entry in the translation table, kept verbatim.
    Other(String),
}

impl Condition {
    /// The six known conditions in canonical order.
    pub const KNOWN: [Condition; 6] = [
        Condition::Nuevo,
        Condition::CasiNuevo,
        Condition::Excelente,
        Condition::Bueno,
        Condition::Justo,
        Condition::Rescatado,
    ];

    /// Display label in the target language.
    pub fn label(&self) -> &str {
        match self {
            Condition::Nuevo => "nuevo",
            Condition::CasiNuevo => "casi nuevo",
            Condition::Excelente => "excelente",
            Condition::Bueno => "bueno",
            Condition::Justo => "justo",
            Condition::Rescatado => "rescatado",
            Condition::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Condition::Other(_))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// YearRange – inclusive model-year interval
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` model-year interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Range that contains every representable year.
    pub const UNBOUNDED: YearRange = YearRange {
        start: i32::MIN,
        end: i32::MAX,
    };

    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Whether `year` lies within the range, inclusive on both ends.
    pub fn contains(&self, year: f64) -> bool {
        year >= f64::from(self.start) && year <= f64::from(self.end)
    }

    /// Order the endpoints and pull both inside `bounds`.
    pub fn clamped_to(self, bounds: YearRange) -> Self {
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        Self {
            start: lo.clamp(bounds.start, bounds.end),
            end: hi.clamp(bounds.start, bounds.end),
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Record – one cleaned listing
// ---------------------------------------------------------------------------

/// A single vehicle listing after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Model year. Imputed values are column medians and may be fractional.
    pub model_year: f64,
    /// Odometer reading, imputed with the column median when missing.
    pub odometer: f64,
    pub condition: Condition,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub model: String,
    /// Asking price; `None` when the source cell was empty or unparseable.
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// CleaningReport – what the cleaner changed
// ---------------------------------------------------------------------------

/// Summary of the imputation performed while loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows: usize,
    pub model_year_median: f64,
    pub odometer_median: f64,
    pub model_year_filled: usize,
    pub odometer_filled: usize,
    /// Non-empty numeric cells that could not be coerced to a number.
    pub unparseable_cells: usize,
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned base dataset with pre-computed filter indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All listings, in source row order.
    pub records: Vec<Record>,
    /// Sorted distinct vehicle types.
    pub types: Vec<String>,
    /// Observed model-year bounds (floor of min, ceil of max).
    pub year_bounds: Option<YearRange>,
    /// Source condition labels that had no translation.
    pub unmapped_conditions: BTreeSet<String>,
    pub report: CleaningReport,
}

impl Dataset {
    /// Build the indices from already-cleaned records.
    pub fn from_records(records: Vec<Record>, report: CleaningReport) -> Self {
        let mut types = BTreeSet::new();
        let mut unmapped_conditions = BTreeSet::new();
        let mut min_year = f64::INFINITY;
        let mut max_year = f64::NEG_INFINITY;

        for rec in &records {
            types.insert(rec.vehicle_type.clone());
            if let Condition::Other(raw) = &rec.condition {
                unmapped_conditions.insert(raw.clone());
            }
            min_year = min_year.min(rec.model_year);
            max_year = max_year.max(rec.model_year);
        }

        let year_bounds = (min_year <= max_year)
            .then(|| YearRange::new(min_year.floor() as i32, max_year.ceil() as i32));

        Dataset {
            records,
            types: types.into_iter().collect(),
            year_bounds,
            unmapped_conditions,
            report,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct conditions present, in canonical order.
    pub fn conditions(&self) -> BTreeSet<Condition> {
        self.records.iter().map(|r| r.condition.clone()).collect()
    }
}
