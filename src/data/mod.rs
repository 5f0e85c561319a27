/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PassengerTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────────────┐
///   │ aggregate / distribution │  rates, rankings, histograms
///   └─────────────────────────┘
/// ```

pub mod aggregate;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
