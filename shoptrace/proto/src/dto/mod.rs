pub mod snapshot;

pub use snapshot::{
    BucketCount, CounterSeries, CounterSnapshot, HistogramSeries, HistogramSnapshot,
    MetricsSnapshot,
};
