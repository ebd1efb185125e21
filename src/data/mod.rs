/// Data layer: core types, loading, filtering and coercion.
///
/// Architecture:
/// ```text
///  data/all_seasons.csv
///        │
///        ▼
///   ┌──────────────┐
///   │ loader/cache  │  parse file once → Arc<Table>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  season / height / category predicates → sub-table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  coerce   │  metric columns → numeric, junk → missing
///   └──────────┘
///        │
///        ▼
///     stats::*
/// ```

pub mod coerce;
pub mod filter;
pub mod loader;
pub mod model;
