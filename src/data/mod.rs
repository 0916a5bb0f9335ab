/// Data layer: core types, loading, and statistics.
///
/// Architecture:
/// ```text
///        .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file, infer dtypes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Column>, equal lengths
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary  │  numeric columns → NumericSummary (+ save to CSV)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod summary;
