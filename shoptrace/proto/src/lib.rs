pub mod dto;
pub mod types;

pub mod prelude {
    // --- Core Value Types ---
    pub use crate::types::TagValue;
    pub use crate::types::{FromTagValue, ToTagValue};

    // --- Error Handling ---
    pub use crate::types::ProtoError;

    // --- Snapshot DTOs ---
    pub use crate::dto::snapshot::{
        BucketCount, CounterSeries, CounterSnapshot, HistogramSeries, HistogramSnapshot,
        MetricsSnapshot,
    };
}
