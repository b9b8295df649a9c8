/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  remote .xlsx / local .xlsx .csv .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → JobDataset  (background: off the UI thread)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ JobDataset  │  Vec<JobRow>, source column names
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → matching row indices
///   └──────────┘
/// ```

pub mod background;
pub mod filter;
pub mod loader;
pub mod model;
