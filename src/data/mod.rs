/// Data layer: labels, loading, conversion, filtering and export.
///
/// Architecture:
/// ```text
///   Hobo .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  title + header row → labeled columns, timestamp index
///   └──────────┘      (header: "Temp, °F (12345)" → (Temp, °F, 12345))
///        │
///        ▼
///   ┌─────────────┐
///   │ HoboDataset  │  Vec<NaiveDateTime> index, Vec<Column>
///   └─────────────┘
///        │
///        ├──► convert   °F columns mirrored into °C columns
///        ├──► filter    time window → row indices
///        └──► export    csv / json / parquet
/// ```

pub mod convert;
pub mod export;
pub mod filter;
pub mod header;
pub mod loader;
pub mod model;
