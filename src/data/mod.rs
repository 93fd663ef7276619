/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file, coerce cells → MovieDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ MovieDataset │  Vec<MovieRecord>, genre/rating/bounds index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  FilterSpec → MovieView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  grouped sums, genre shares, summary
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
