use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic used-vehicle listing file for demos.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of listings.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// Output path; `.csv` or `.parquet`.
    #[arg(long, default_value = "vehicles_sample.csv")]
    out: PathBuf,

    /// RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Seeded splitmix64 stream; reproducible across runs and platforms.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Normal sample via the polar Marsaglia method.
    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + sd * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// (model, type, price when new)
const MODELS: [(&str, &str, f64); 10] = [
    ("ford f-150", "pickup", 38_000.0),
    ("chevrolet silverado", "pickup", 36_000.0),
    ("ram 1500", "pickup", 37_000.0),
    ("toyota camry", "sedan", 26_000.0),
    ("honda civic", "sedan", 22_000.0),
    ("hyundai sonata", "sedan", 23_000.0),
    ("jeep wrangler", "SUV", 33_000.0),
    ("bmw x5", "SUV", 58_000.0),
    ("ford mustang", "coupe", 30_000.0),
    ("honda odyssey", "mini-van", 32_000.0),
];

/// Source condition labels with rough shares; the last one is deliberately
/// outside the translation table.
const CONDITIONS: [(&str, f64); 7] = [
    ("excellent", 0.47),
    ("good", 0.38),
    ("like new", 0.09),
    ("fair", 0.03),
    ("new", 0.01),
    ("salvage", 0.01),
    ("unknown", 0.01),
];

struct Listing {
    model_year: Option<f64>,
    odometer: Option<f64>,
    condition: &'static str,
    vehicle_type: &'static str,
    model: &'static str,
    price: i64,
}

fn generate(rows: usize, rng: &mut Rng) -> Vec<Listing> {
    (0..rows)
        .map(|_| {
            let &(model, vehicle_type, new_price) = rng.pick(&MODELS);
            let age = (rng.unit() * 25.0).floor();
            let year = 2019.0 - age;

            let mut roll = rng.unit();
            let mut condition = CONDITIONS[0].0;
            for &(label, share) in &CONDITIONS {
                if roll < share {
                    condition = label;
                    break;
                }
                roll -= share;
            }

            let miles = (age * 12_000.0 + rng.normal(0.0, 15_000.0)).max(0.0).round();
            let depreciation = 0.85_f64.powf(age);
            let price = (new_price * depreciation * rng.normal(1.0, 0.12)).max(500.0).round() as i64;

            Listing {
                model_year: (!rng.chance(0.07)).then_some(year),
                odometer: (!rng.chance(0.15)).then_some(miles),
                condition,
                vehicle_type,
                model,
                price,
            }
        })
        .collect()
}

fn write_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["price", "model_year", "model", "condition", "odometer", "type"])?;
    for l in listings {
        let number = |v: Option<f64>| v.map(|v| format!("{v:.1}")).unwrap_or_default();
        writer.write_record([
            l.price.to_string(),
            number(l.model_year),
            l.model.to_string(),
            l.condition.to_string(),
            number(l.odometer),
            l.vehicle_type.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, listings: &[Listing]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("price", DataType::Int64, false),
        Field::new("model_year", DataType::Float64, true),
        Field::new("model", DataType::Utf8, false),
        Field::new("condition", DataType::Utf8, false),
        Field::new("odometer", DataType::Float64, true),
        Field::new("type", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(listings.iter().map(|l| l.price))),
            Arc::new(listings.iter().map(|l| l.model_year).collect::<Float64Array>()),
            Arc::new(StringArray::from_iter_values(listings.iter().map(|l| l.model))),
            Arc::new(StringArray::from_iter_values(listings.iter().map(|l| l.condition))),
            Arc::new(listings.iter().map(|l| l.odometer).collect::<Float64Array>()),
            Arc::new(StringArray::from_iter_values(listings.iter().map(|l| l.vehicle_type))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = Rng(args.seed);
    let listings = generate(args.rows, &mut rng);

    let ext = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.out, &listings)?,
        "parquet" | "pq" => write_parquet(&args.out, &listings)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} listings to {}", listings.len(), args.out.display());
    Ok(())
}
