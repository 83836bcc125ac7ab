pub mod context;
pub mod errors;
pub mod export;
pub mod metrics;
pub mod trace;

pub use context::{TelemetryContext, INSTRUMENTATION_NAME, INSTRUMENTATION_VERSION};
pub use errors::TelemetryError;
pub use export::{LogSink, MemorySink, SpanSink};
pub use metrics::{CounterHandle, HistogramHandle, InstrumentKind};
pub use trace::{current_span, tag, ActiveSpan, Span, SpanScope, SpanStatus, Tag, Timestamp};
