/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable → StockTable (dates validated)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ StockTable │  rows, stock / date / classification / attribute columns
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  classification → distinct stocks
///   └──────────┘
/// ```

pub mod dates;
pub mod filter;
pub mod loader;
pub mod model;
