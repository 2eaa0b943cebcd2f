/// Data layer: core types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawListing rows (bad numbers → missing)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  median imputation, condition translation → Dataset
///   └──────────┘
///        │        (held by `cache`, one load per path + mtime)
///        ▼
///   ┌──────────┐
///   │  filter   │  type → year range → model → FilterView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  avg price per model, chart series
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
