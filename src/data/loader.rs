use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::clean::{self, category, Coercion, RawListing};
use super::error::DataError;
use super::model::Dataset;

/// Columns every listing file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "model_year",
    "odometer",
    "condition",
    "type",
    "model",
    "price",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a listing file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, extra columns ignored (the usual `vehicles_us.csv`)
/// * `.json`    – `[{ "model_year": 2011, "odometer": 145000, ... }, ...]`
/// * `.parquet` – numeric columns of any int/float type, string categoricals
pub fn load_file(path: &Path) -> Result<Dataset, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut coercion = Coercion::default();
    let raw = match ext.as_str() {
        "csv" => read_csv(path, &mut coercion)?,
        "json" => read_json(path, &mut coercion)?,
        "parquet" | "pq" => read_parquet(path, &mut coercion)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string())),
    };

    log::info!("Read {} rows from {}", raw.len(), path.display());
    clean::clean(raw, coercion.unparseable)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Cells are read as text so a malformed number degrades to a missing value
/// instead of failing the whole row.
#[derive(Debug, Deserialize)]
struct CsvRow {
    model_year: Option<String>,
    odometer: Option<String>,
    condition: Option<String>,
    #[serde(rename = "type")]
    vehicle_type: Option<String>,
    model: Option<String>,
    price: Option<String>,
}

fn read_csv(path: &Path, coercion: &mut Coercion) -> Result<Vec<RawListing>, DataError> {
    // Short rows leave their trailing cells missing instead of failing the load.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(DataError::MissingColumn(missing.to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        rows.push(RawListing {
            model_year: coercion.number(row.model_year.as_deref()),
            odometer: coercion.number(row.odometer.as_deref()),
            condition: category(row.condition.as_deref()),
            vehicle_type: category(row.vehicle_type.as_deref()),
            model: category(row.model.as_deref()),
            price: coercion.number(row.price.as_deref()),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "price": 9400, "model_year": 2011.0, "model": "bmw x5",
///     "condition": "good", "odometer": 145000.0, "type": "SUV" },
///   ...
/// ]
/// ```
fn read_json(path: &Path, coercion: &mut Coercion) -> Result<Vec<RawListing>, DataError> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: Vec<JsonValue> = serde_json::from_str(&text)?;

    root.iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec.as_object().ok_or_else(|| DataError::MalformedRow {
                row: i,
                reason: "not a JSON object".to_string(),
            })?;

            let mut number = |key: &str| match obj.get(key) {
                None | Some(JsonValue::Null) => None,
                Some(JsonValue::Number(n)) => coercion.accept(n.as_f64()),
                Some(JsonValue::String(s)) => coercion.number(Some(s.as_str())),
                Some(_) => coercion.accept(None),
            };
            let model_year = number("model_year");
            let odometer = number("odometer");
            let price = number("price");

            let text = |key: &str| match obj.get(key) {
                Some(JsonValue::String(s)) => category(Some(s.as_str())),
                Some(JsonValue::Null) | None => category(None),
                Some(other) => category(Some(other.to_string().as_str())),
            };

            Ok(RawListing {
                model_year,
                odometer,
                condition: text("condition"),
                vehicle_type: text("type"),
                model: text("model"),
                price,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings.
///
/// Numeric columns may be any integer or float type (Pandas writes
/// `model_year` as float64 because of its nulls); they are cast to Float64.
/// Categorical columns are cast to Utf8. Nulls are missing values.
fn read_parquet(path: &Path, coercion: &mut Coercion) -> Result<Vec<RawListing>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = builder.schema().clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| schema.index_of(col).is_err())
    {
        return Err(DataError::MissingColumn(missing.to_string()));
    }

    let reader = builder.build()?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let model_year = column(&batch, "model_year", &DataType::Float64)?;
        let odometer = column(&batch, "odometer", &DataType::Float64)?;
        let price = column(&batch, "price", &DataType::Float64)?;
        let condition = column(&batch, "condition", &DataType::Utf8)?;
        let vehicle_type = column(&batch, "type", &DataType::Utf8)?;
        let model = column(&batch, "model", &DataType::Utf8)?;

        let model_year = model_year.as_primitive::<Float64Type>();
        let odometer = odometer.as_primitive::<Float64Type>();
        let price = price.as_primitive::<Float64Type>();
        let condition = condition.as_string::<i32>();
        let vehicle_type = vehicle_type.as_string::<i32>();
        let model = model.as_string::<i32>();

        for row in 0..batch.num_rows() {
            let mut number = |arr: &arrow::array::Float64Array| {
                if arr.is_null(row) {
                    None
                } else {
                    coercion.accept(Some(arr.value(row)))
                }
            };
            let text = |arr: &arrow::array::StringArray| {
                category((!arr.is_null(row)).then(|| arr.value(row)))
            };

            rows.push(RawListing {
                model_year: number(model_year),
                odometer: number(odometer),
                price: number(price),
                condition: text(condition),
                vehicle_type: text(vehicle_type),
                model: text(model),
            });
        }
    }
    Ok(rows)
}

/// Fetch a named column and cast it to `to`. Values that cannot be cast
/// become nulls.
fn column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, DataError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
    Ok(cast(col, to)?)
}
