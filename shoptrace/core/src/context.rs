//! The telemetry context.
//!
//! One `TelemetryContext` is constructed at startup and handed to every
//! component that records telemetry. There is deliberately no process-wide
//! default: tests and embedders build their own context over whatever sink
//! they want.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use shoptrace_proto::dto::MetricsSnapshot;

use crate::errors::TelemetryError;
use crate::export::SpanSink;
use crate::metrics::{CounterCell, CounterHandle, HistogramCell, HistogramHandle, InstrumentKind};
use crate::trace::{Span, SpanScope};

pub const INSTRUMENTATION_NAME: &str = "shoptrace";
pub const INSTRUMENTATION_VERSION: &str = env!("CARGO_PKG_VERSION");

struct Instrument {
    kind: InstrumentKind,
    description: String,
    unit: Option<String>,
    cell: Cell,
}

enum Cell {
    Counter(Arc<CounterCell>),
    Histogram(Arc<HistogramCell>),
}

/// Process-wide tracer/meter state: the instrument registry and the span
/// sink, behind an explicitly constructed, shareable value.
pub struct TelemetryContext {
    instruments: RwLock<BTreeMap<String, Instrument>>,
    sink: Arc<dyn SpanSink>,
}

impl TelemetryContext {
    pub fn new(sink: Arc<dyn SpanSink>) -> Self {
        TelemetryContext {
            instruments: RwLock::new(BTreeMap::new()),
            sink,
        }
    }

    /// Registers a counter, or returns the existing handle for `name`.
    ///
    /// Registration is idempotent per name; re-registering a name that is
    /// already a histogram fails with `TelemetryError::InstrumentKind`.
    pub fn register_counter(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CounterHandle, TelemetryError> {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = instruments.get(name) {
            return match &existing.cell {
                Cell::Counter(cell) => Ok(CounterHandle { cell: cell.clone() }),
                Cell::Histogram(_) => Err(TelemetryError::InstrumentKind {
                    name: name.to_string(),
                    registered: existing.kind,
                    requested: InstrumentKind::Counter,
                }),
            };
        }

        let cell = Arc::new(CounterCell::default());
        instruments.insert(
            name.to_string(),
            Instrument {
                kind: InstrumentKind::Counter,
                description: description.to_string(),
                unit: None,
                cell: Cell::Counter(cell.clone()),
            },
        );
        log::debug!("registered counter `{name}`");
        Ok(CounterHandle { cell })
    }

    /// Registers a histogram, with the same idempotency contract as
    /// [`register_counter`](Self::register_counter).
    pub fn register_histogram(
        &self,
        name: &str,
        description: &str,
        unit: &str,
    ) -> Result<HistogramHandle, TelemetryError> {
        let mut instruments = self
            .instruments
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = instruments.get(name) {
            return match &existing.cell {
                Cell::Histogram(cell) => Ok(HistogramHandle { cell: cell.clone() }),
                Cell::Counter(_) => Err(TelemetryError::InstrumentKind {
                    name: name.to_string(),
                    registered: existing.kind,
                    requested: InstrumentKind::Histogram,
                }),
            };
        }

        let cell = Arc::new(HistogramCell::new());
        instruments.insert(
            name.to_string(),
            Instrument {
                kind: InstrumentKind::Histogram,
                description: description.to_string(),
                unit: Some(unit.to_string()),
                cell: Cell::Histogram(cell.clone()),
            },
        );
        log::debug!("registered histogram `{name}`");
        Ok(HistogramHandle { cell })
    }

    /// Adds `amount` to the counter under the given tag set. Infallible.
    pub fn increment(&self, handle: &CounterHandle, amount: u64, tags: &[(&str, &str)]) {
        handle.cell.add(amount, tags);
    }

    /// Records one histogram sample under the given tag set. Infallible.
    pub fn record(&self, handle: &HistogramHandle, value: f64, tags: &[(&str, &str)]) {
        handle.cell.record(value, tags);
    }

    /// Starts a scoped span; see [`SpanScope::run`].
    pub fn scope<N: Into<String>>(&self, name: N) -> SpanScope<'_> {
        SpanScope::new(self, name.into())
    }

    /// Aggregates every registered instrument into a snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let instruments = self
            .instruments
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut counters = Vec::new();
        let mut histograms = Vec::new();
        for (name, instrument) in instruments.iter() {
            match &instrument.cell {
                Cell::Counter(cell) => {
                    counters.push(cell.snapshot(name, &instrument.description));
                }
                Cell::Histogram(cell) => {
                    histograms.push(cell.snapshot(
                        name,
                        &instrument.description,
                        instrument.unit.as_deref(),
                    ));
                }
            }
        }
        MetricsSnapshot {
            service: INSTRUMENTATION_NAME.to_string(),
            version: INSTRUMENTATION_VERSION.to_string(),
            captured_at: Utc::now(),
            counters,
            histograms,
        }
    }

    /// Drains buffered finished spans from the sink.
    ///
    /// Called once at process teardown; also usable mid-run by tests and
    /// collectors.
    pub fn flush(&self) -> Vec<Span> {
        self.sink.drain()
    }

    pub(crate) fn sink(&self) -> Arc<dyn SpanSink> {
        self.sink.clone()
    }
}
