/// Data layer: core types, loading, and ranking.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / https://
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Dataset (once, at startup)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<InspectionRecord>, cuisine index (read-only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  cuisine + grade predicate, dedup, sort → top N
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
