mod instrument;

pub use instrument::{CounterHandle, HistogramHandle, InstrumentKind};

pub(crate) use instrument::{CounterCell, HistogramCell};
