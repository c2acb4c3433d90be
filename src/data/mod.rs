/// Data layer: the record schema, source-file loading, and the in-memory table.
///
/// Architecture:
/// ```text
///   ┌──────────┐
///   │  sample   │  seeded synthetic rows → .csv
///   └──────────┘
///        │
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<HousingRecord>
///   └──────────┘
///        │            (store writes / reads housing_data)
///        ▼
///   ┌──────────┐
///   │  model    │  HousingRecord, raw Value, column schema
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  frame    │  raw rows → RecordBatch → feature matrix / target
///   └──────────┘
/// ```

pub mod frame;
pub mod loader;
pub mod model;
pub mod sample;
