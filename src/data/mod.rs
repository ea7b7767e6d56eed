/// Data layer: shared value types and response-table loading.
///
/// Architecture:
/// ```text
///  cmf.csv / crf.json / d65.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ResponseTable / white point
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    model      │  Metric, MetricResult, ResponseTable
///   └──────────────┘
/// ```

pub mod loader;
pub mod model;
